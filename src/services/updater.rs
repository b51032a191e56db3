use crate::error::{BookmarkError, Result, TocGenError};
use crate::services::bookmarks::{BookmarkReader, BookmarkWriter};
use crate::services::commenter::CommentSyntax;
use crate::services::document::TextDocument;
use crate::services::settings::SettingsLoader;
use crate::services::toc::TocRewriter;
use crate::types::{Notice, RewriteOutcome, UpdateReport, UpdateRequest};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::fs;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// One lock per document. A second update of the same document is refused while one runs.
#[derive(Default)]
pub struct DocumentLocks {
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl DocumentLocks {
    pub fn try_acquire(&self, path: &Path) -> Result<DocumentGuard<'_>> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(path.to_path_buf()).or_default().clone()
        };
        match lock.try_lock_owned() {
            Ok(guard) => Ok(DocumentGuard {
                guard: Some(guard),
                locks: self,
                path: path.to_path_buf(),
            }),
            Err(_) => {
                self.release(path);
                Err(TocGenError::Busy {
                    path: path.display().to_string(),
                })
            }
        }
    }

    /// Number of documents with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    // Only the map holds the lock once every guard and pending acquirer is gone
    fn release(&self, path: &Path) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.get(path).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(path);
        }
    }
}

/// Exclusive hold on one document. Dropping it frees the document's lock entry.
pub struct DocumentGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DocumentLocks,
    path: PathBuf,
}

impl Drop for DocumentGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.path);
    }
}

#[derive(Default)]
pub struct TocUpdater {
    separator: Option<String>,
    max_lines_search: Option<usize>,
    locks: DocumentLocks,
}

impl TocUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    /// Separator to use instead of the workspace setting.
    pub fn with_separator(mut self, separator: Option<String>) -> Self {
        self.separator = separator;
        self
    }

    /// Scan depth to use instead of the workspace setting.
    pub fn with_max_lines_search(mut self, max_lines_search: Option<usize>) -> Self {
        self.max_lines_search = max_lines_search;
        self
    }

    pub fn locks(&self) -> &DocumentLocks {
        &self.locks
    }

    /// Regenerate the table of contents of `request.file` and write it back.
    pub async fn update(&self, request: &UpdateRequest) -> Result<UpdateReport> {
        self.run(request, true).await
    }

    /// Compute the regenerated file without writing it. `changed` reports a stale block.
    pub async fn check(&self, request: &UpdateRequest) -> Result<UpdateReport> {
        self.run(request, false).await
    }

    async fn run(&self, request: &UpdateRequest, write: bool) -> Result<UpdateReport> {
        if fs::metadata(&request.file).await.is_err() {
            return Err(TocGenError::FileNotFound {
                path: request.file.display().to_string(),
            });
        }

        let file = fs::canonicalize(&request.file).await?;
        let _guard = self.locks.try_acquire(&file)?;
        let commenter = CommentSyntax::resolve(&file, request.comment_token.as_deref())?;

        let workspace = match &request.workspace {
            Some(root) => Some(fs::canonicalize(root).await.unwrap_or_else(|_| root.clone())),
            None => BookmarkReader::discover_workspace(&file).await,
        };

        let config = SettingsLoader::load(workspace.as_deref())
            .await
            .with_overrides(self.separator.clone(), self.max_lines_search);
        debug!(
            "Using separator '{}' with scan depth {}",
            config.separator, config.max_lines_search
        );

        let mut notices = Vec::new();
        let (bookmarks, bookmarks_read) =
            match BookmarkReader::read(workspace.as_deref(), Some(&file)).await {
                Ok(lines) => (lines, true),
                Err(e) => {
                    if let Some(notice) = Self::notice_for(&e) {
                        warn!("Error reading bookmarks: {}", e);
                        info!("{}", notice);
                        notices.push(notice);
                    }
                    (Vec::new(), false)
                }
            };

        let original = fs::read_to_string(&file).await?;
        let mut doc = TextDocument::parse(&original);

        let rewriter = TocRewriter::new(config)?;
        let outcome = rewriter.rewrite(&mut doc, &bookmarks, &commenter)?;
        notices.extend(outcome.notices.iter().cloned());

        let content = doc.render();
        let changed = content != original;
        let written = write && changed && !request.dry_run;

        let mut bookmarks_moved = 0;
        if written {
            fs::write(&file, &content).await?;
            info!("Updated table of contents in {}", file.display());
            if let Some(root) = workspace.as_deref().filter(|_| bookmarks_read) {
                bookmarks_moved = Self::follow_moved_lines(root, &file, &outcome).await;
            }
        } else if !changed {
            info!("Table of contents in {} is up to date", file.display());
        }

        Ok(UpdateReport {
            file,
            bookmarks,
            outcome,
            notices,
            changed,
            written,
            bookmarks_moved,
            content,
            updated_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Point the bookmarks of `file` at the lines they marked before the block changed size.
    async fn follow_moved_lines(root: &Path, file: &Path, outcome: &RewriteOutcome) -> usize {
        let moves: HashMap<usize, usize> = outcome
            .entries
            .iter()
            .map(|entry| (entry.source_line, entry.display_line - 1))
            .collect();

        let relocated = match BookmarkReader::relative_path(root, file) {
            Ok(relative) => BookmarkWriter::relocate(root, &relative, &moves).await,
            Err(e) => Err(e),
        };
        relocated.unwrap_or_else(|e| {
            warn!("Bookmarks were not moved with their lines: {}", e);
            0
        })
    }

    fn notice_for(error: &BookmarkError) -> Option<Notice> {
        match error {
            BookmarkError::NoWorkspace => Some(Notice::NoWorkspace),
            e if e.is_reportable() => Some(Notice::BookmarksUnavailable {
                reason: e.to_string(),
            }),
            _ => None,
        }
    }
}
