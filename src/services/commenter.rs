use crate::error::{Result, TocGenError};
use crate::services::document::Document;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::debug;

/// Marks a range of lines as comments, the capability editors expose as "comment line".
pub trait LineCommenter {
    /// Comment every non-blank line in the range, even lines that already look commented.
    fn comment_lines(&self, doc: &mut dyn Document, lines: RangeInclusive<usize>) -> Result<()>;

    /// Uncomment the range when every non-blank line is a comment, otherwise comment it.
    fn toggle_comment(&self, doc: &mut dyn Document, lines: RangeInclusive<usize>) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentSyntax {
    /// A prefix such as `//` or `#`.
    Line { token: String },
    /// Each line wrapped in a block comment, such as `<!-- ... -->`.
    Wrap { open: String, close: String },
}

impl CommentSyntax {
    pub fn line(token: &str) -> Self {
        CommentSyntax::Line {
            token: token.to_string(),
        }
    }

    pub fn wrap(open: &str, close: &str) -> Self {
        CommentSyntax::Wrap {
            open: open.to_string(),
            close: close.to_string(),
        }
    }

    /// Pick the comment syntax for a file from its extension.
    pub fn for_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        let syntax = match extension.as_str() {
            "rs" | "c" | "h" | "cc" | "cpp" | "hpp" | "cs" | "java" | "kt" | "kts" | "scala"
            | "go" | "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "swift" | "dart" | "php"
            | "groovy" | "zig" | "jsonc" => Self::line("//"),
            "py" | "rb" | "sh" | "bash" | "zsh" | "fish" | "pl" | "r" | "toml" | "yaml"
            | "yml" | "ps1" | "cmake" | "jl" | "nim" | "ex" | "exs" | "tf" => Self::line("#"),
            "sql" | "lua" | "hs" | "elm" | "ada" => Self::line("--"),
            "tex" | "sty" | "m" | "erl" => Self::line("%"),
            "lisp" | "clj" | "el" | "scm" | "ini" | "asm" => Self::line(";"),
            "vim" => Self::line("\""),
            "bat" | "cmd" => Self::line("REM"),
            "md" | "markdown" | "html" | "htm" | "xml" | "svg" | "vue" => {
                Self::wrap("<!--", "-->")
            }
            "css" => Self::wrap("/*", "*/"),
            _ => return None,
        };
        Some(syntax)
    }

    /// Resolve the syntax for `path`, preferring an explicit line token.
    pub fn resolve(path: &Path, token: Option<&str>) -> Result<Self> {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            return Ok(Self::line(token.trim()));
        }
        Self::for_path(path).ok_or_else(|| TocGenError::UnsupportedLanguage {
            path: path.display().to_string(),
        })
    }

    fn is_commented(&self, body: &str) -> bool {
        match self {
            CommentSyntax::Line { token } => body.starts_with(token.as_str()),
            CommentSyntax::Wrap { open, close } => {
                body.starts_with(open.as_str())
                    && body.ends_with(close.as_str())
                    && body.len() >= open.len() + close.len()
            }
        }
    }

    fn comment(&self, body: &str) -> String {
        match self {
            CommentSyntax::Line { token } => format!("{} {}", token, body),
            CommentSyntax::Wrap { open, close } => format!("{} {} {}", open, body, close),
        }
    }

    fn uncomment(&self, body: &str) -> String {
        match self {
            CommentSyntax::Line { token } => {
                let rest = &body[token.len()..];
                rest.strip_prefix(' ').unwrap_or(rest).to_string()
            }
            CommentSyntax::Wrap { open, close } => {
                let inner = &body[open.len()..body.len() - close.len()];
                let inner = inner.strip_prefix(' ').unwrap_or(inner);
                inner.strip_suffix(' ').unwrap_or(inner).to_string()
            }
        }
    }
}

impl LineCommenter for CommentSyntax {
    fn comment_lines(&self, doc: &mut dyn Document, lines: RangeInclusive<usize>) -> Result<()> {
        self.edit_range(doc, lines, true)
    }

    fn toggle_comment(&self, doc: &mut dyn Document, lines: RangeInclusive<usize>) -> Result<()> {
        self.edit_range(doc, lines, false)
    }
}

impl CommentSyntax {
    fn edit_range(
        &self,
        doc: &mut dyn Document,
        lines: RangeInclusive<usize>,
        always_comment: bool,
    ) -> Result<()> {
        let (first, last) = (*lines.start(), *lines.end());
        if last >= doc.line_count() || first > last {
            return Err(TocGenError::LineRange {
                start: first,
                end: last + 1,
                line_count: doc.line_count(),
            });
        }

        let originals: Vec<String> = (first..=last)
            .filter_map(|idx| doc.line(idx).map(str::to_string))
            .collect();

        // Indentation measured in chars so the insertion point is always a char boundary
        let indents: Vec<Option<usize>> = originals
            .iter()
            .map(|line| {
                if line.trim().is_empty() {
                    None
                } else {
                    Some(line.chars().take_while(|c| c.is_whitespace()).count())
                }
            })
            .collect();

        let Some(min_indent) = indents.iter().flatten().min().copied() else {
            debug!("Nothing to comment between lines {} and {}", first + 1, last + 1);
            return Ok(());
        };

        let uncommenting = !always_comment
            && originals
                .iter()
                .zip(&indents)
                .filter(|(_, indent)| indent.is_some())
                .all(|(line, _)| self.is_commented(line.trim_start()));

        let toggled = originals
            .iter()
            .zip(&indents)
            .map(|(line, indent)| match indent {
                None => line.clone(),
                Some(indent) if uncommenting => {
                    let split = byte_offset(line, *indent);
                    format!("{}{}", &line[..split], self.uncomment(&line[split..]))
                }
                Some(_) => {
                    let split = byte_offset(line, min_indent);
                    format!("{}{}", &line[..split], self.comment(&line[split..]))
                }
            })
            .collect();

        debug!(
            "{} lines {}-{}",
            if uncommenting { "Uncommented" } else { "Commented" },
            first + 1,
            last + 1
        );
        doc.replace_lines(first..last + 1, toggled)
    }
}

fn byte_offset(line: &str, chars: usize) -> usize {
    line.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::document::TextDocument;
    use std::path::PathBuf;

    #[test]
    fn test_syntax_from_extension() {
        assert_eq!(
            CommentSyntax::for_path(&PathBuf::from("src/main.rs")),
            Some(CommentSyntax::line("//"))
        );
        assert_eq!(
            CommentSyntax::for_path(&PathBuf::from("setup.PY")),
            Some(CommentSyntax::line("#"))
        );
        assert_eq!(
            CommentSyntax::for_path(&PathBuf::from("README.md")),
            Some(CommentSyntax::wrap("<!--", "-->"))
        );
        assert_eq!(CommentSyntax::for_path(&PathBuf::from("notes.unknown")), None);
        assert_eq!(CommentSyntax::for_path(&PathBuf::from("Makefile")), None);
    }

    #[test]
    fn test_override_token_wins() {
        let syntax =
            CommentSyntax::resolve(&PathBuf::from("notes.unknown"), Some(" ;; ")).unwrap();
        assert_eq!(syntax, CommentSyntax::line(";;"));

        let err = CommentSyntax::resolve(&PathBuf::from("notes.unknown"), None).unwrap_err();
        assert!(matches!(err, TocGenError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn test_comments_non_blank_lines_at_min_indent() {
        let mut doc = TextDocument::from_lines(["keep", "  a", "", "    b", "keep"]);
        CommentSyntax::line("//")
            .toggle_comment(&mut doc, 1..=3)
            .unwrap();
        assert_eq!(doc.lines(), &["keep", "  // a", "", "  //   b", "keep"]);
    }

    #[test]
    fn test_toggle_uncomments_fully_commented_range() {
        let mut doc = TextDocument::from_lines(["# a", "", "  #b"]);
        CommentSyntax::line("#").toggle_comment(&mut doc, 0..=2).unwrap();
        assert_eq!(doc.lines(), &["a", "", "  b"]);
    }

    #[test]
    fn test_partially_commented_range_is_commented() {
        let mut doc = TextDocument::from_lines(["# a", "b"]);
        CommentSyntax::line("#").toggle_comment(&mut doc, 0..=1).unwrap();
        assert_eq!(doc.lines(), &["# # a", "# b"]);
    }

    #[test]
    fn test_comment_lines_never_uncomments() {
        let mut doc = TextDocument::from_lines(["####", "", "", "####"]);
        let syntax = CommentSyntax::line("#");
        syntax.comment_lines(&mut doc, 0..=3).unwrap();
        assert_eq!(doc.lines(), &["# ####", "", "", "# ####"]);

        syntax.comment_lines(&mut doc, 0..=0).unwrap();
        assert_eq!(doc.line(0), Some("# # ####"));
    }

    #[test]
    fn test_wrap_syntax_round_trips() {
        let mut doc = TextDocument::from_lines(["title", "", "1: x"]);
        let syntax = CommentSyntax::wrap("<!--", "-->");
        syntax.toggle_comment(&mut doc, 0..=2).unwrap();
        assert_eq!(doc.lines(), &["<!-- title -->", "", "<!-- 1: x -->"]);

        syntax.toggle_comment(&mut doc, 0..=2).unwrap();
        assert_eq!(doc.lines(), &["title", "", "1: x"]);
    }

    #[test]
    fn test_range_past_end_is_rejected() {
        let mut doc = TextDocument::from_lines(["a"]);
        let result = CommentSyntax::line("//").toggle_comment(&mut doc, 0..=1);
        assert!(matches!(result, Err(TocGenError::LineRange { .. })));
    }
}
