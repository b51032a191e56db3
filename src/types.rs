use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_SEPARATOR: &str = "*---------------------------------------------------------*";
pub const DEFAULT_MAX_LINES_SEARCH: usize = 100;

/// Contents of `.vscode/bookmarks.json` as written by the Bookmarks extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkFile {
    #[serde(default)]
    pub files: Vec<BookmarkedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkedFile {
    pub path: String,
    pub bookmarks: Option<Vec<BookmarkEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub line: usize,
    pub column: Option<usize>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocConfig {
    pub separator: String,
    pub max_lines_search: usize,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_lines_search: DEFAULT_MAX_LINES_SEARCH,
        }
    }
}

/// An existing block found in a document, 0-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocBlock {
    pub start: usize,
    pub end: usize,
}

impl TocBlock {
    pub fn span(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start..=self.end).contains(&line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Bookmarked line before the edit, 0-based.
    pub source_line: usize,
    /// Line number shown in the block, 1-based, valid after the edit.
    pub display_line: usize,
    pub text: String,
}

impl fmt::Display for TocEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.display_line, self.text)
    }
}

/// Informational messages for the user. None of them is a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    NoWorkspace,
    BookmarksUnavailable { reason: String },
    BlockDeleted { start: usize, end: usize },
    BlockInserted { start: usize, end: usize },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoWorkspace => write!(f, "No workspace is open."),
            Notice::BookmarksUnavailable { reason } => write!(
                f,
                "Could not read bookmarks ({}). Have you enabled \"Save Bookmarks in Project\" \
                 in the Bookmarks extension settings?",
                reason
            ),
            Notice::BlockDeleted { start, end } => write!(
                f,
                "Detected and deleted table of contents between lines {} and {}.",
                start, end
            ),
            Notice::BlockInserted { start, end } => write!(
                f,
                "Inserted new table of contents between lines {} and {}.",
                start, end
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteOutcome {
    pub deleted: Option<TocBlock>,
    pub inserted: TocBlock,
    pub offset: isize,
    pub entries: Vec<TocEntry>,
    /// Bookmarks left out of the block: past the end of the document or inside the old block.
    pub skipped: Vec<usize>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub file: PathBuf,
    pub workspace: Option<PathBuf>,
    pub comment_token: Option<String>,
    pub dry_run: bool,
}

impl UpdateRequest {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            workspace: None,
            comment_token: None,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub file: PathBuf,
    pub bookmarks: Vec<usize>,
    pub outcome: RewriteOutcome,
    pub notices: Vec<Notice>,
    /// Whether the rewritten content differs from what was on disk.
    pub changed: bool,
    pub written: bool,
    /// Bookmarks moved in `bookmarks.json` to follow their lines after the write.
    pub bookmarks_moved: usize,
    #[serde(skip)]
    pub content: String,
    pub updated_at: String,
}
