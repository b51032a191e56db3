use bookmarks_toc_gen::{BookmarkReader, Notice, TocUpdater, UpdateRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCE: &str = r#"use std::env;

// Parse command line arguments
fn parse() -> Vec<String> {
    env::args().collect()
}

// Main entry point
fn main() {
    let _args = parse();
}
"#;

// Helper to lay out a workspace with a bookmark file
fn create_workspace(bookmarks: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir_all(dir.path().join(".vscode")).unwrap();
    fs::write(dir.path().join(".vscode/bookmarks.json"), bookmarks).unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    let file = dir.path().join("src/main.rs");
    fs::write(&file, SOURCE).unwrap();
    (dir, file)
}

fn write_bookmarks(root: &Path, lines: &[usize]) {
    let marks: Vec<String> = lines
        .iter()
        .map(|line| format!(r#"{{"line":{},"column":0}}"#, line))
        .collect();
    let json = format!(
        r#"{{"files":[{{"path":"src/main.rs","bookmarks":[{}]}}]}}"#,
        marks.join(",")
    );
    fs::write(root.join(".vscode/bookmarks.json"), json).unwrap();
}

#[tokio::test]
async fn test_update_creates_commented_block() {
    let (dir, file) = create_workspace("{}");
    write_bookmarks(dir.path(), &[2, 7]);

    let report = TocUpdater::new()
        .update(&UpdateRequest::new(&file))
        .await
        .unwrap();

    assert_eq!(report.bookmarks, vec![2, 7]);
    assert!(report.written);
    assert_eq!(report.outcome.offset, 6);

    let content = fs::read_to_string(&file).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "// *---------------------------------------------------------*");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "// 9: Parse command line arguments");
    assert_eq!(lines[3], "// 14: Main entry point");
    assert_eq!(lines[4], "");
    assert_eq!(lines[5], "// *---------------------------------------------------------*");
    assert_eq!(lines[8], "// Parse command line arguments");
    assert_eq!(lines[13], "// Main entry point");

    assert_eq!(
        report.notices,
        vec![Notice::BlockInserted { start: 1, end: 6 }]
    );
}

#[tokio::test]
async fn test_second_update_is_stable() {
    let (dir, file) = create_workspace("{}");
    write_bookmarks(dir.path(), &[2, 7]);
    let updater = TocUpdater::new();

    let report = updater.update(&UpdateRequest::new(&file)).await.unwrap();
    assert_eq!(report.bookmarks_moved, 2);
    let first = fs::read_to_string(&file).unwrap();

    // The bookmark file now follows the lines pushed down by the block
    let root = fs::canonicalize(dir.path()).unwrap();
    let moved = BookmarkReader::read(Some(&root), Some(&report.file))
        .await
        .unwrap();
    assert_eq!(moved, vec![8, 13]);

    let report = updater.update(&UpdateRequest::new(&file)).await.unwrap();

    assert!(!report.changed);
    assert!(!report.written);
    assert!(report.outcome.skipped.is_empty());
    assert_eq!(fs::read_to_string(&file).unwrap(), first);
    assert_eq!(
        report.notices,
        vec![
            Notice::BlockDeleted { start: 1, end: 6 },
            Notice::BlockInserted { start: 1, end: 6 },
        ]
    );

    let check = updater.check(&UpdateRequest::new(&file)).await.unwrap();
    assert!(!check.changed);
}

#[tokio::test]
async fn test_missing_entry_writes_empty_block() {
    let (_dir, file) =
        create_workspace(r#"{"files":[{"path":"src/other.rs","bookmarks":[{"line":1}]}]}"#);

    let report = TocUpdater::new()
        .update(&UpdateRequest::new(&file))
        .await
        .unwrap();

    assert!(report.bookmarks.is_empty());
    assert!(report.outcome.entries.is_empty());
    match report.notices.first() {
        Some(Notice::BookmarksUnavailable { reason }) => assert!(reason.contains("src/main.rs")),
        other => panic!("unexpected notice: {:?}", other),
    }

    let content = fs::read_to_string(&file).unwrap();
    let separator = "// *---------------------------------------------------------*";
    let expected = format!("{sep}\n\n\n{sep}\nuse std::env;\n", sep = separator);
    assert!(content.starts_with(&expected));
}

#[tokio::test]
async fn test_workspace_settings_and_overrides() {
    let (dir, file) = create_workspace("{}");
    write_bookmarks(dir.path(), &[7]);
    fs::write(
        dir.path().join(".vscode/settings.json"),
        r#"{"bookmarks-toc-gen.separator": "==== contents ===="}"#,
    )
    .unwrap();

    TocUpdater::new()
        .update(&UpdateRequest::new(&file))
        .await
        .unwrap();
    let content = fs::read_to_string(&file).unwrap();
    assert!(content.starts_with("// ==== contents ====\n\n// 13: Main entry point\n"));

    // A separator given explicitly wins; the old block is no longer recognised
    let mut request = UpdateRequest::new(&file);
    request.comment_token = Some("#".to_string());
    request.dry_run = true;
    let report = TocUpdater::new()
        .with_separator(Some("####".to_string()))
        .update(&request)
        .await
        .unwrap();

    assert!(report.outcome.deleted.is_none());
    assert!(report.content.starts_with("# ####\n"));
    assert_eq!(fs::read_to_string(&file).unwrap(), content);
}
