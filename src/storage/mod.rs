//! Persistence layer.
//!
//! Saves and loads the trade registry (actor statuses and deal log) to/from
//! a JSON file. The engine itself never touches disk; this is the caller's
//! side of the contract.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::registry::TradeRegistry;

/// Default state file path.
pub const DEFAULT_STATE_FILE: &str = "trade_sim_state.json";

/// Sibling file the registry is written to before it replaces `path`.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save the registry to a JSON file.
///
/// The JSON goes to a staging file first and is renamed over `path`, so a
/// crash mid-write leaves the previous deal log intact.
pub fn save_registry(registry: &TradeRegistry, path: Option<&str>) -> Result<()> {
    let path = Path::new(path.unwrap_or(DEFAULT_STATE_FILE));
    let staging = staging_path(path);

    let json = serde_json::to_vec_pretty(registry).context("Failed to serialise trade registry")?;
    fs::write(&staging, json)
        .with_context(|| format!("Failed to write state to {}", staging.display()))?;
    fs::rename(&staging, path)
        .with_context(|| format!("Failed to move state into place at {}", path.display()))?;

    debug!(
        path = %path.display(),
        actors = registry.len(),
        deals = registry.deals().len(),
        "Registry saved"
    );
    Ok(())
}

/// Load the registry from a JSON file.
/// Returns None if the file doesn't exist (fresh start).
pub fn load_registry(path: Option<&str>) -> Result<Option<TradeRegistry>> {
    let path = path.unwrap_or(DEFAULT_STATE_FILE);

    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path, "No saved registry, starting fresh");
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read state from {path}")),
    };

    let registry: TradeRegistry =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse state from {path}"))?;

    info!(
        path,
        actors = registry.len(),
        deals = registry.deals().len(),
        "Registry restored"
    );
    Ok(Some(registry))
}

/// Remove the state file and any staging leftover. Missing files are fine.
pub fn delete_state(path: Option<&str>) -> Result<()> {
    let path = Path::new(path.unwrap_or(DEFAULT_STATE_FILE));
    for file in [staging_path(path), path.to_path_buf()] {
        match fs::remove_file(&file) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to delete state file {}", file.display()))
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
