//! Souffle - a template-driven static site builder with a dev server.

mod build;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod render;
mod serve;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use std::{thread, time::Duration};

use build::BuildPipeline;
use cli::Cli;
use config::SiteConfig;
use serve::DevServer;
use watch::{DebouncedTrigger, FileWatcher};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = SiteConfig::load(&cli)?;
    cli::init::ensure_site_structure(&config)?;

    if cli.dev {
        run_dev(&config)
    } else {
        run_build(&config)
    }
}

/// One-shot production build. A failure exits non-zero.
fn run_build(config: &SiteConfig) -> Result<()> {
    let pipeline = BuildPipeline::new(config);
    pipeline.build()?;

    // Production output must not poll for reloads.
    embed::disable_hot_reload(&config.output_dir())?;

    log!("build"; "site built into {}", config.output_dir().display());
    Ok(())
}

/// Dev mode: initial build, then watch + serve until interrupted.
fn run_dev(config: &SiteConfig) -> Result<()> {
    let pipeline = BuildPipeline::new(config);

    // The initial build goes through the trigger so a broken tree at
    // startup retries in place instead of aborting.
    let mut trigger = DebouncedTrigger::new();
    trigger.fire(&mut || pipeline.build());
    if core::is_shutdown() {
        return Ok(());
    }

    let server = DevServer::bind(config.serve.addr(), config.output_dir())?;
    log!("serve"; "listening on http://{}", server.addr());
    let running = server.spawn();

    let watcher = FileWatcher::spawn(
        config.templates_dir(),
        pipeline,
        running.handle(),
        trigger,
    )?;
    log!("watch"; "watching {}", config.templates_dir().display());

    while !core::is_shutdown() {
        thread::sleep(Duration::from_millis(200));
    }

    log!("serve"; "shutting down...");
    running.close();
    watcher.stop();
    running.join_with_grace();
    watcher.join_with_grace();

    Ok(())
}
