use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "show-exporter")]
#[command(about = "Look up TV show titles on IMDb and export the matches as an import-ready CSV")]
pub struct Cli {
    /// Text file with one show title per line
    pub input: PathBuf,

    /// Output CSV path
    #[arg(default_value = "tv_shows_imdb.csv")]
    pub output: PathBuf,

    /// Seconds to wait between lookups (0 = no delay)
    #[arg(long)]
    pub delay: Option<f64>,

    /// Lookup attempts per title before recording a failure
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Resume from a saved checkpoint without prompting
    #[arg(long)]
    pub resume: bool,

    /// Discard any saved checkpoint and start from the beginning
    #[arg(long, conflicts_with = "resume")]
    pub restart: bool,

    /// Enable debug diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}
