use crate::services::bookmarks::EDITOR_DIR;
use crate::types::{TocConfig, DEFAULT_MAX_LINES_SEARCH, DEFAULT_SEPARATOR};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

pub const SETTINGS_FILE: &str = "settings.json";

/// The keys this tool reads from the workspace settings file.
#[derive(Debug, Default, Deserialize)]
struct WorkspaceSettings {
    #[serde(rename = "bookmarks-toc-gen.separator")]
    separator: Option<String>,
    #[serde(rename = "bookmarks-toc-gen.maxLinesSearch")]
    max_lines_search: Option<usize>,
}

pub struct SettingsLoader;

impl SettingsLoader {
    pub fn settings_path(root: &Path) -> PathBuf {
        root.join(EDITOR_DIR).join(SETTINGS_FILE)
    }

    /// Load the workspace configuration, falling back to defaults for anything missing.
    pub async fn load(workspace: Option<&Path>) -> TocConfig {
        let Some(root) = workspace else {
            return TocConfig::default();
        };

        let path = Self::settings_path(root);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("No workspace settings at {}: {}", path.display(), e);
                return TocConfig::default();
            }
        };

        match serde_json::from_str::<WorkspaceSettings>(&content) {
            Ok(settings) => TocConfig::default()
                .with_overrides(settings.separator, settings.max_lines_search),
            Err(e) => {
                warn!("Ignoring unparsable settings file {}: {}", path.display(), e);
                TocConfig::default()
            }
        }
    }
}

impl TocConfig {
    /// Apply overrides. Empty separators and a zero scan depth keep the current value.
    pub fn with_overrides(
        mut self,
        separator: Option<String>,
        max_lines_search: Option<usize>,
    ) -> Self {
        if let Some(separator) = separator.filter(|s| !s.is_empty()) {
            self.separator = separator;
        }
        if let Some(depth) = max_lines_search.filter(|depth| *depth > 0) {
            self.max_lines_search = depth;
        }
        if self.separator.is_empty() {
            self.separator = DEFAULT_SEPARATOR.to_string();
        }
        if self.max_lines_search == 0 {
            self.max_lines_search = DEFAULT_MAX_LINES_SEARCH;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn workspace_with(settings: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(EDITOR_DIR)).await.unwrap();
        fs::write(SettingsLoader::settings_path(dir.path()), settings)
            .await
            .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_defaults_without_workspace() {
        assert_eq!(SettingsLoader::load(None).await, TocConfig::default());

        let dir = TempDir::new().unwrap();
        assert_eq!(SettingsLoader::load(Some(dir.path())).await, TocConfig::default());
    }

    #[tokio::test]
    async fn test_reads_workspace_keys() {
        let dir = workspace_with(
            r#"{
                "editor.tabSize": 4,
                "bookmarks-toc-gen.separator": "=== TOC ===",
                "bookmarks-toc-gen.maxLinesSearch": 40
            }"#,
        )
        .await;

        let config = SettingsLoader::load(Some(dir.path())).await;
        assert_eq!(config.separator, "=== TOC ===");
        assert_eq!(config.max_lines_search, 40);
    }

    #[tokio::test]
    async fn test_falsy_values_and_bad_json_fall_back() {
        let dir = workspace_with(
            r#"{"bookmarks-toc-gen.separator": "", "bookmarks-toc-gen.maxLinesSearch": 0}"#,
        )
        .await;
        assert_eq!(SettingsLoader::load(Some(dir.path())).await, TocConfig::default());

        let dir = workspace_with("{ // comments are not JSON\n }").await;
        assert_eq!(SettingsLoader::load(Some(dir.path())).await, TocConfig::default());
    }

    #[test]
    fn test_overrides_replace_loaded_values() {
        let config = TocConfig::default().with_overrides(Some("#####".to_string()), Some(10));
        assert_eq!(config.separator, "#####");
        assert_eq!(config.max_lines_search, 10);

        let config = config.with_overrides(None, Some(0));
        assert_eq!(config.max_lines_search, 10);
    }
}
