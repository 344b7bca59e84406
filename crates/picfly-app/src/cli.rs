use std::path::PathBuf;

use clap::Parser;

/// picfly: screenshot upload and OCR on global hotkeys.
#[derive(Parser, Debug)]
#[command(name = "picfly", version, about)]
pub struct Args {
    /// Profile or config file to use instead of the main profile.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
