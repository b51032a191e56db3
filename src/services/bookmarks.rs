use crate::error::BookmarkError;
use crate::types::BookmarkFile;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Directory, relative to the workspace root, holding editor state.
pub const EDITOR_DIR: &str = ".vscode";
pub const BOOKMARKS_FILE: &str = "bookmarks.json";

pub struct BookmarkReader;

impl BookmarkReader {
    /// Bookmarked lines (0-based, file order) for `active_file` in `workspace`.
    pub async fn read(
        workspace: Option<&Path>,
        active_file: Option<&Path>,
    ) -> Result<Vec<usize>, BookmarkError> {
        let root = workspace.ok_or(BookmarkError::NoWorkspace)?;
        let bookmarks = Self::load(root).await?;

        let file = active_file.ok_or(BookmarkError::NoActiveFile)?;
        let relative = Self::relative_path(root, file)?;
        let lines = Self::lines_for(&bookmarks, &relative)?;

        info!("Found {} bookmarks for {}", lines.len(), relative);
        Ok(lines)
    }

    pub fn bookmarks_path(root: &Path) -> PathBuf {
        root.join(EDITOR_DIR).join(BOOKMARKS_FILE)
    }

    pub async fn load(root: &Path) -> Result<BookmarkFile, BookmarkError> {
        let path = Self::bookmarks_path(root);
        debug!("Reading bookmarks from {}", path.display());

        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| BookmarkError::Unreadable {
                path: path.clone(),
                source,
            })?;

        serde_json::from_str(&content)
            .map_err(|source| BookmarkError::Malformed { path, source })
    }

    pub fn lines_for(
        bookmarks: &BookmarkFile,
        relative: &str,
    ) -> Result<Vec<usize>, BookmarkError> {
        let wanted = normalize_entry_path(relative);
        let entry = bookmarks
            .files
            .iter()
            .find(|file| normalize_entry_path(&file.path) == wanted)
            .ok_or_else(|| BookmarkError::NoEntry {
                path: relative.to_string(),
            })?;

        let marks = entry
            .bookmarks
            .as_ref()
            .ok_or_else(|| BookmarkError::MissingBookmarks {
                path: relative.to_string(),
            })?;

        Ok(marks.iter().map(|mark| mark.line).collect())
    }

    /// Workspace-relative path of `file`, with `/` separators.
    pub fn relative_path(root: &Path, file: &Path) -> Result<String, BookmarkError> {
        let relative = file
            .strip_prefix(root)
            .map_err(|_| BookmarkError::OutsideWorkspace {
                file: file.to_path_buf(),
                workspace: root.to_path_buf(),
            })?;

        Ok(relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// Closest ancestor of `file` that holds an editor state directory.
    pub async fn discover_workspace(file: &Path) -> Option<PathBuf> {
        for dir in file.ancestors().skip(1) {
            let is_root = fs::metadata(dir.join(EDITOR_DIR))
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            if is_root {
                debug!("Using workspace root {}", dir.display());
                return Some(dir.to_path_buf());
            }
        }
        None
    }
}

/// Keeps `bookmarks.json` in step with a file whose lines were moved by an update.
pub struct BookmarkWriter;

impl BookmarkWriter {
    /// Move the bookmarks of `relative` according to `moves` (old line to new line).
    ///
    /// The file is edited as plain JSON so fields this crate does not model survive.
    /// Returns how many bookmarks moved.
    pub async fn relocate(
        root: &Path,
        relative: &str,
        moves: &HashMap<usize, usize>,
    ) -> Result<usize, BookmarkError> {
        if moves.is_empty() {
            return Ok(0);
        }

        let path = BookmarkReader::bookmarks_path(root);
        let content = fs::read_to_string(&path)
            .await
            .map_err(|source| BookmarkError::Unreadable {
                path: path.clone(),
                source,
            })?;
        let mut document: Value =
            serde_json::from_str(&content).map_err(|source| BookmarkError::Malformed {
                path: path.clone(),
                source,
            })?;

        let wanted = normalize_entry_path(relative);
        let entry = document
            .get_mut("files")
            .and_then(Value::as_array_mut)
            .and_then(|files| {
                files.iter_mut().find(|file| {
                    file.get("path")
                        .and_then(Value::as_str)
                        .is_some_and(|entry_path| normalize_entry_path(entry_path) == wanted)
                })
            })
            .ok_or_else(|| BookmarkError::NoEntry {
                path: relative.to_string(),
            })?;
        let marks = entry
            .get_mut("bookmarks")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| BookmarkError::MissingBookmarks {
                path: relative.to_string(),
            })?;

        let mut moved = 0;
        for mark in marks.iter_mut() {
            let Some(line) = mark.get("line").and_then(Value::as_u64) else {
                continue;
            };
            if let Some(&to) = moves.get(&(line as usize)) {
                if to as u64 != line {
                    mark["line"] = Value::from(to);
                    moved += 1;
                }
            }
        }

        if moved == 0 {
            return Ok(0);
        }

        let json = serde_json::to_string_pretty(&document).map_err(|source| {
            BookmarkError::Malformed {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, json)
            .await
            .map_err(|source| BookmarkError::Unwritable {
                path: path.clone(),
                source,
            })?;

        info!("Moved {} bookmarks of {} in {}", moved, relative, path.display());
        Ok(moved)
    }
}

fn normalize_entry_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    unified.trim_start_matches("./").to_string()
}
