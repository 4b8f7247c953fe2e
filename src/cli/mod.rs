pub mod commands;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(name = "runnel")]
#[command(about = "Turn a social timeline page into an RSS feed", long_about = None)]
pub struct Cli {
    /// URL of the timeline page
    pub url: String,

    /// Where to write the RSS document
    pub dest: PathBuf,

    /// Config file (default: ~/.config/runnel/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Markup profile to use instead of matching on the URL host
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Read an already rendered page from disk instead of launching a browser
    #[arg(long, value_name = "FILE")]
    pub html: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Milliseconds to wait for late content after the first post appears
    #[arg(long, value_name = "MS")]
    pub wait_ms: Option<u64>,
}
