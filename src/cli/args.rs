//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Souffle static site builder CLI
///
/// Without flags the site is built once and the process exits.
/// With `--dev` an initial build is followed by watch + serve until
/// interrupted.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Start the development server with file watching and live reload
    #[arg(short, long)]
    pub dev: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Port number to listen on (dev mode)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Config file path (default: souffle.toml)
    #[arg(short = 'C', long, default_value = "souffle.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
