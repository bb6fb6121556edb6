//! Build manifest.
//!
//! A single small record written as the last step of a successful build.
//! Polling clients compare its timestamp against the current time to detect
//! fresh builds without inspecting content.

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

/// Manifest file name inside the output directory.
pub const MANIFEST_FILE: &str = "last-update-date.json";

/// Completion record of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Wall-clock completion time in milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Write the manifest into `output_dir` with the current timestamp.
pub fn write(output_dir: &Path) -> io::Result<()> {
    let manifest = BuildManifest {
        timestamp: now_millis(),
    };
    let json = serde_json::to_string(&manifest).map_err(io::Error::other)?;
    fs::write(output_dir.join(MANIFEST_FILE), json)
}

/// Read the manifest from `output_dir`, if present and valid.
pub fn read(output_dir: &Path) -> Option<BuildManifest> {
    let raw = fs::read_to_string(output_dir.join(MANIFEST_FILE)).ok()?;
    serde_json::from_str(&raw).ok()
}
