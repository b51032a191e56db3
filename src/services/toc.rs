use crate::error::Result;
use crate::services::commenter::LineCommenter;
use crate::services::document::{Document, LineEdit};
use crate::types::{Notice, RewriteOutcome, TocBlock, TocConfig, TocEntry};
use regex::Regex;
use tracing::{debug, info, warn};

/// Characters allowed before the separator on a delimiter line, room for a comment prefix.
const SEPARATOR_SLACK: usize = 5;

pub struct TocRewriter {
    config: TocConfig,
    alphabetic: Regex,
}

impl TocRewriter {
    pub fn new(config: TocConfig) -> Result<Self> {
        Ok(Self {
            config,
            alphabetic: Regex::new(r"[a-zA-Z]")?,
        })
    }

    pub fn config(&self) -> &TocConfig {
        &self.config
    }

    /// Find the first two separator lines within the scan depth.
    pub fn locate_block(&self, doc: &impl Document) -> Option<TocBlock> {
        let window = self.config.separator.chars().count() + SEPARATOR_SLACK;
        let depth = doc.line_count().min(self.config.max_lines_search);

        let mut start = None;
        for idx in 0..depth {
            let Some(line) = doc.line(idx) else { break };
            let head: String = line.chars().take(window).collect();
            if !head.contains(self.config.separator.as_str()) {
                continue;
            }
            match start {
                None => start = Some(idx),
                Some(start) => {
                    debug!("Found table of contents at lines {}-{}", start + 1, idx + 1);
                    return Some(TocBlock { start, end: idx });
                }
            }
        }

        debug!("No table of contents within the first {} lines", depth);
        None
    }

    /// The text of a bookmarked line from its first to its last ASCII letter.
    pub fn strip_line_text(&self, line: &str) -> String {
        let Some(first) = self.alphabetic.find(line) else {
            return line.trim().to_string();
        };
        let last = self
            .alphabetic
            .find_iter(line)
            .last()
            .map(|m| m.end())
            .unwrap_or(first.end());
        line[first.start()..last].to_string()
    }

    /// Lines of a block around the given entry lines.
    pub fn render_block(&self, entries: &[TocEntry]) -> Vec<String> {
        let mut lines = vec![self.config.separator.clone(), String::new()];
        lines.extend(entries.iter().map(ToString::to_string));
        lines.push(String::new());
        lines.push(self.config.separator.clone());
        lines
    }

    /// Number of lines a block has besides its entries.
    pub fn frame_len(&self) -> usize {
        self.render_block(&[]).len()
    }

    /// Net change in line count from replacing `existing` by a block of `entry_count` entries.
    pub fn line_offset(&self, existing: Option<TocBlock>, entry_count: usize) -> isize {
        let old_span = existing.map(|block| block.span()).unwrap_or(0);
        (self.frame_len() + entry_count) as isize - old_span as isize
    }

    pub fn rewrite<D: Document>(
        &self,
        doc: &mut D,
        bookmarks: &[usize],
        commenter: &dyn LineCommenter,
    ) -> Result<RewriteOutcome> {
        let existing = self.locate_block(&*doc);
        let mut notices = Vec::new();

        let mut kept = Vec::new();
        let mut skipped = Vec::new();
        for &line in bookmarks {
            if line >= doc.line_count() {
                warn!("Bookmark on line {} is past the end of the document", line + 1);
                skipped.push(line);
            } else if existing.is_some_and(|block| block.contains(line)) {
                warn!("Bookmark on line {} points into the table of contents", line + 1);
                skipped.push(line);
            } else {
                kept.push(line);
            }
        }

        let offset = self.line_offset(existing, kept.len());
        let insert_at = existing.map(|block| block.start).unwrap_or(0);

        let entries: Vec<TocEntry> = kept
            .iter()
            .map(|&line| {
                let shift = if existing.is_some_and(|block| line < block.start) {
                    0
                } else {
                    offset
                };
                TocEntry {
                    source_line: line,
                    display_line: (line as isize + 1 + shift) as usize,
                    text: self.strip_line_text(doc.line(line).unwrap_or_default()),
                }
            })
            .collect();

        if let Some(block) = existing {
            let notice = Notice::BlockDeleted {
                start: block.start + 1,
                end: block.end + 1,
            };
            info!("{}", notice);
            notices.push(notice);
        }

        let lines = self.render_block(&entries);
        let block_len = lines.len();

        LineEdit {
            delete: existing.map(|block| block.start..=block.end),
            insert_at,
            lines,
        }
        .apply(doc)?;

        let inserted = TocBlock {
            start: insert_at,
            end: insert_at + block_len - 1,
        };
        commenter.comment_lines(doc, inserted.start..=inserted.end)?;

        let notice = Notice::BlockInserted {
            start: inserted.start + 1,
            end: inserted.end + 1,
        };
        info!("{}", notice);
        notices.push(notice);

        Ok(RewriteOutcome {
            deleted: existing,
            inserted,
            offset,
            entries,
            skipped,
            notices,
        })
    }
}
