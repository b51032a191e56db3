pub mod bookmarks;
pub mod commenter;
pub mod document;
pub mod settings;
pub mod toc;
pub mod updater;

pub use bookmarks::{BookmarkReader, BookmarkWriter};
pub use commenter::{CommentSyntax, LineCommenter};
pub use document::{Document, LineEdit, TextDocument};
pub use settings::SettingsLoader;
pub use toc::TocRewriter;
pub use updater::{DocumentGuard, DocumentLocks, TocUpdater};
