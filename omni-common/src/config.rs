//! Configuration file resolution and TOML loading
//!
//! Config values resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! This module provides the file-location and parsing half of that chain;
//! each service merges the tiers into its own config struct.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Locate the config file for a service, e.g. `brain` ->
/// `~/.config/omni/brain.toml`, falling back to `/etc/omni/brain.toml`
/// on Linux. Returns `None` when no file exists; a missing config file is
/// not an error, the compiled defaults apply.
pub fn config_file_path(service: &str) -> Option<PathBuf> {
    let file_name = format!("{}.toml", service);

    if let Some(dir) = dirs::config_dir() {
        let user_config = dir.join("omni").join(&file_name);
        if user_config.exists() {
            return Some(user_config);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/omni").join(&file_name);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Read and parse a TOML config file into the given type.
pub fn load_toml<T: DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read config failed: {} ({})", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse config failed: {} ({})", path.display(), e)))
}

/// OS data directory for Omni state (`~/.local/share` on Linux).
///
/// The model weights and the memory database live under here by default,
/// matching the layout the setup scripts install into.
pub fn data_local_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("/var/lib/omni"))
}
