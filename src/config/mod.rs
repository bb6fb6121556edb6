//! Site configuration management for `souffle.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                  |
//! |-----------|------------------------------------------|
//! | `[paths]` | Source tree and output directory paths   |
//! | `[serve]` | Development server (interface, port)     |
//!
//! The config file is optional; a missing file yields defaults. CLI flags
//! override file values.

use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

/// Root configuration structure representing souffle.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Source tree and output paths
    pub paths: PathsConfig,

    /// Development server settings
    pub serve: ServeConfig,
}

/// `[paths]` section configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Template source tree, relative to the project root.
    pub templates: PathBuf,

    /// Build output directory, relative to the project root.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            templates: PathBuf::from("templates"),
            output: PathBuf::from("dist"),
        }
    }
}

/// `[serve]` section configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8110,
        }
    }
}

impl ServeConfig {
    /// The socket address the dev server binds.
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.interface, self.port)
    }
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Reads the config file when present, falls back to defaults otherwise,
    /// then applies CLI overrides. The project root is the current directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.is_file() {
            Self::from_path(&cli.config)?
        } else {
            Self::default()
        };

        config.root = std::env::current_dir().context("failed to resolve current directory")?;

        if let Some(port) = cli.port {
            config.serve.port = port;
        }

        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))
    }

    /// Absolute path of the template source tree.
    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(&self.paths.templates)
    }

    /// Absolute path of the build output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.paths.output)
    }
}
