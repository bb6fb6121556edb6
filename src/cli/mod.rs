//! Command-line surface and first-run scaffolding.

mod args;
pub mod init;

pub use args::Cli;
