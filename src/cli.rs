/// CLI argument parsing.
use std::path::PathBuf;

use clap::Parser;

/// Reserved pseudo-path that opens a built-in demo timeline.
pub const TUTORIAL_PATH: &str = ":tutorial:";

#[derive(Parser)]
#[command(
    name = "timeline",
    version,
    about = "A terminal-based timeline viewer and editor"
)]
pub struct Cli {
    /// Timeline file to open. Pass ':tutorial:' for a built-in demo; a path
    /// that does not exist yet is created on first save.
    pub timeline_path: Option<PathBuf>,

    /// Read configuration from this TOML file instead of the default
    /// location.
    #[arg(long = "config-file")]
    pub config_file: Option<PathBuf>,
}
