use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "toc-gen")]
#[command(about = "Regenerate a table of contents comment block from editor bookmarks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite the table of contents of each file
    Update(UpdateArgs),

    /// Report files whose table of contents is out of date
    Check(CheckArgs),

    /// List the bookmarks recorded for a file
    Bookmarks(BookmarksArgs),
}

#[derive(Args)]
pub struct TocOptions {
    /// Workspace root holding .vscode/bookmarks.json (default: nearest ancestor with .vscode)
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Delimiter line content, overrides the workspace setting
    #[arg(long, value_name = "TEXT")]
    pub separator: Option<String>,

    /// Number of lines searched for an existing block, overrides the workspace setting
    #[arg(long, value_name = "LINES")]
    pub max_lines_search: Option<usize>,

    /// Line comment token to use instead of the one implied by the file extension
    #[arg(long, value_name = "TOKEN")]
    pub comment_token: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Files to update
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub options: TocOptions,

    /// Print the updated content instead of writing it
    #[arg(long)]
    pub dry_run: bool,

    /// Write the update reports to a JSON file
    #[arg(long, value_name = "FILE")]
    pub json_output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Files to check
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub options: TocOptions,
}

#[derive(Args)]
pub struct BookmarksArgs {
    /// File whose bookmarks are listed
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Workspace root holding .vscode/bookmarks.json (default: nearest ancestor with .vscode)
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
}
