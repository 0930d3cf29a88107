use clap::{Args, Parser, Subcommand};

use crate::cover::DEFAULT_COVER_SERVICE;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and validate a library, then print a summary.
    Check(CheckArgs),
    /// Render the library as a static HTML site.
    Export(ExportArgs),
    /// Print persisted detail-page view counts.
    Views(ViewsArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Library: a .json/.yaml file or a directory of Markdown files.
    #[arg(long)]
    pub books: String,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Library: a .json/.yaml file or a directory of Markdown files.
    #[arg(long)]
    pub books: String,

    /// Output directory for the site (must not exist).
    #[arg(long)]
    pub out: String,

    /// URL path the site is hosted under.
    #[arg(long, default_value = "/")]
    pub base_path: String,

    /// Site title shown in the list header.
    #[arg(long, default_value = "My Reading Log")]
    pub site_title: String,

    /// Base URL for fallback cover images.
    #[arg(long, default_value = DEFAULT_COVER_SERVICE)]
    pub cover_service: String,
}

#[derive(Debug, Args)]
pub struct ViewsArgs {
    /// Data directory used by `readlog-app`.
    #[arg(long, default_value = "readlog-data")]
    pub data_dir: String,

    /// Library used to show titles next to ids.
    #[arg(long)]
    pub books: Option<String>,
}
