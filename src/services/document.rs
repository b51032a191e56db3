use crate::error::{Result, TocGenError};
use std::ops::{Range, RangeInclusive};

/// Line-addressed text buffer the rewriter edits.
pub trait Document {
    fn line_count(&self) -> usize;

    fn line(&self, index: usize) -> Option<&str>;

    /// Replace the lines in `range` with `lines`. An empty range inserts.
    fn replace_lines(&mut self, range: Range<usize>, lines: Vec<String>) -> Result<()>;
}

/// A combined delete + insert. Both positions refer to the document before the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    pub delete: Option<RangeInclusive<usize>>,
    pub insert_at: usize,
    pub lines: Vec<String>,
}

impl LineEdit {
    pub fn apply<D: Document + ?Sized>(self, doc: &mut D) -> Result<()> {
        let range = match &self.delete {
            Some(deleted) => {
                if *deleted.start() != self.insert_at {
                    return Err(TocGenError::LineRange {
                        start: self.insert_at,
                        end: *deleted.start(),
                        line_count: doc.line_count(),
                    });
                }
                *deleted.start()..*deleted.end() + 1
            }
            None => self.insert_at..self.insert_at,
        };
        doc.replace_lines(range, self.lines)
    }
}

/// In-memory document backed by a file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
    line_ending: &'static str,
    trailing_newline: bool,
}

impl TextDocument {
    pub fn parse(content: &str) -> Self {
        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
        let lines = content
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();

        Self {
            lines,
            line_ending,
            trailing_newline: content.is_empty() || content.ends_with('\n'),
        }
    }

    pub fn from_lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            line_ending: "\n",
            trailing_newline: true,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        let mut content = self.lines.join(self.line_ending);
        if self.trailing_newline && !self.lines.is_empty() {
            content.push_str(self.line_ending);
        }
        content
    }
}

impl Document for TextDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    fn replace_lines(&mut self, range: Range<usize>, lines: Vec<String>) -> Result<()> {
        if range.start > range.end || range.end > self.lines.len() {
            return Err(TocGenError::LineRange {
                start: range.start,
                end: range.end,
                line_count: self.lines.len(),
            });
        }
        drop(self.lines.splice(range, lines));
        Ok(())
    }
}
