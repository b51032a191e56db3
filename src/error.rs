use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TocGenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Line range {start}..{end} is outside the document ({line_count} lines)")]
    LineRange {
        start: usize,
        end: usize,
        line_count: usize,
    },

    #[error("No comment syntax known for '{path}', pass --comment-token")]
    UnsupportedLanguage { path: String },

    #[error("An update of {path} is already in progress")]
    Busy { path: String },
}

pub type Result<T> = std::result::Result<T, TocGenError>;

/// Reasons the bookmark source could not produce a list for the active file.
///
/// None of these abort an update: the updater downgrades them to an empty list.
#[derive(Error, Debug)]
pub enum BookmarkError {
    #[error("No workspace is open")]
    NoWorkspace,

    #[error("No active file")]
    NoActiveFile,

    #[error("{file} is not inside workspace {workspace}")]
    OutsideWorkspace { file: PathBuf, workspace: PathBuf },

    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed bookmark file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No bookmark entry for {path}")]
    NoEntry { path: String },

    #[error("Bookmark entry for {path} has no bookmarks list")]
    MissingBookmarks { path: String },
}

impl BookmarkError {
    /// Whether the user should be told about this failure.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, BookmarkError::NoActiveFile)
    }
}
