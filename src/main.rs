mod cli;

use anyhow::{bail, Context};
use bookmarks_toc_gen::{BookmarkReader, TocConfig, TocRewriter, TocUpdater, UpdateRequest};
use clap::Parser;
use cli::{BookmarksArgs, CheckArgs, Cli, Commands, TocOptions, UpdateArgs};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging, RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match &cli.command {
        Commands::Update(args) => handle_update_command(args).await,
        Commands::Check(args) => handle_check_command(args).await,
        Commands::Bookmarks(args) => handle_bookmarks_command(args).await,
    };

    if let Err(e) = result {
        error!("Operation failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn build_updater(options: &TocOptions) -> TocUpdater {
    TocUpdater::new()
        .with_separator(options.separator.clone())
        .with_max_lines_search(options.max_lines_search)
}

fn build_request(file: &Path, options: &TocOptions) -> UpdateRequest {
    UpdateRequest {
        file: file.to_path_buf(),
        workspace: options.workspace.clone(),
        comment_token: options.comment_token.clone(),
        dry_run: false,
    }
}

async fn handle_update_command(args: &UpdateArgs) -> anyhow::Result<()> {
    info!("Updating table of contents in {} files", args.files.len());

    let updater = build_updater(&args.options);
    let mut reports = Vec::new();

    for (idx, file) in args.files.iter().enumerate() {
        info!("Processing file {}/{}: {}", idx + 1, args.files.len(), file.display());

        let mut request = build_request(file, &args.options);
        request.dry_run = args.dry_run;

        let report = updater
            .update(&request)
            .await
            .with_context(|| format!("Failed to update {}", file.display()))?;

        for notice in &report.notices {
            info!("TOC-GEN: {}", notice);
        }
        for skipped in &report.outcome.skipped {
            warn!("  Skipped bookmark on line {}", skipped + 1);
        }

        if args.dry_run {
            print!("{}", report.content);
        }

        reports.push(report);
    }

    // Write JSON output if requested
    if let Some(json_path) = &args.json_output {
        let json_content =
            serde_json::to_string_pretty(&reports).context("Failed to serialize update reports")?;

        tokio::fs::write(json_path, json_content)
            .await
            .context("Failed to write JSON report file")?;

        info!("Update reports written to: {}", json_path.display());
    }

    info!("Update completed successfully!");
    Ok(())
}

async fn handle_check_command(args: &CheckArgs) -> anyhow::Result<()> {
    info!("Checking {} files", args.files.len());

    let updater = build_updater(&args.options);
    let mut stale = Vec::new();

    for file in &args.files {
        let report = updater
            .check(&build_request(file, &args.options))
            .await
            .with_context(|| format!("Failed to check {}", file.display()))?;

        if report.changed {
            warn!("✗ Stale: {}", file.display());
            stale.push(file);
        } else {
            info!("✓ Up to date: {}", file.display());
        }
    }

    println!("\n=== Check Summary ===");
    println!(
        "Up to date: {}/{}",
        args.files.len() - stale.len(),
        args.files.len()
    );

    if !stale.is_empty() {
        println!("Stale:");
        for file in &stale {
            println!("  - {}", file.display());
        }
        bail!("{} files have an out of date table of contents", stale.len());
    }

    Ok(())
}

async fn handle_bookmarks_command(args: &BookmarksArgs) -> anyhow::Result<()> {
    let file = tokio::fs::canonicalize(&args.file)
        .await
        .with_context(|| format!("Cannot open {}", args.file.display()))?;

    let workspace = match &args.workspace {
        Some(root) => Some(tokio::fs::canonicalize(root).await.unwrap_or_else(|_| root.clone())),
        None => BookmarkReader::discover_workspace(&file).await,
    };

    let lines = BookmarkReader::read(workspace.as_deref(), Some(&file))
        .await
        .context("Could not read bookmarks")?;

    let content = tokio::fs::read_to_string(&file).await?;
    let source: Vec<&str> = content.lines().collect();
    let rewriter = TocRewriter::new(TocConfig::default())?;

    println!("\n=== Bookmarks for '{}' ===", file.display());
    println!("Total bookmarks: {}", lines.len());
    for line in lines {
        match source.get(line) {
            Some(text) => println!("  {}: {}", line + 1, rewriter.strip_line_text(text)),
            None => println!("  {}: (past end of file)", line + 1),
        }
    }

    Ok(())
}
