//! # Bookmarks TOC Generator
//!
//! Regenerates a commented "table of contents" block near the top of a source file
//! from the lines bookmarked in the workspace's `.vscode/bookmarks.json`.
//! Each bookmark is listed with the line number it will have after the block is
//! rewritten, followed by the bookmarked line's text without comment markers.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bookmarks_toc_gen::{TocUpdater, UpdateRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let updater = TocUpdater::new();
//!     let report = updater.update(&UpdateRequest::new("src/main.rs")).await?;
//!
//!     for notice in &report.notices {
//!         println!("{}", notice);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod services;
pub mod types;

// Re-export main types and services for easier usage
pub use error::{BookmarkError, Result, TocGenError};
pub use services::{
    BookmarkReader, BookmarkWriter, CommentSyntax, Document, DocumentGuard, DocumentLocks,
    LineCommenter, LineEdit, SettingsLoader, TextDocument, TocRewriter, TocUpdater,
};
pub use types::{
    BookmarkEntry, BookmarkFile, BookmarkedFile, Notice, RewriteOutcome, TocBlock, TocConfig,
    TocEntry, UpdateReport, UpdateRequest, DEFAULT_MAX_LINES_SEARCH, DEFAULT_SEPARATOR,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
