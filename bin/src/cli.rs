use clap::{Args, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "glide", about = "Smooth-scrolling viewport engine")]
pub struct Cli {
    /// Config file, overriding `.glide/config.toml` discovery.
    #[arg(long, global = true, env = "GLIDE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file, or directory for the default file name.
    #[arg(long, global = true, env = "GLIDE_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Replay a scroll script against a headless window.
    Replay(ReplayArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Text file to display.
    pub file: PathBuf,

    /// Script to replay. Read from stdin when omitted.
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Text area width in pixels.
    #[arg(long, default_value = "640")]
    pub width: i32,

    /// Text area height in pixels.
    #[arg(long, default_value = "320")]
    pub height: i32,

    /// Jump instead of animating.
    #[arg(long)]
    pub no_smooth: bool,
}
