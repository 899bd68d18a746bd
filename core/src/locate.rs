//! Locating the game's current account-state file on disk.
//!
//! The game keeps one subdirectory per server profile under its state root
//! (e.g. `Standalone/States/nvprod`), each holding a handful of
//! `*State.json` documents. The locator is read-only: it lists, it never
//! touches.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::TrackerConfig;
use crate::error::TrackerError;

/// Naming convention for account-state documents.
const STATE_FILE_SUFFIX: &str = "State.json";

/// True when `path` follows the account-state naming convention.
pub fn is_state_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(STATE_FILE_SUFFIX))
}

/// Resolve the profile directory and return the most recently modified
/// account-state file inside it.
pub fn locate_state_file(config: &TrackerConfig) -> Result<PathBuf, TrackerError> {
    let profile_dir = resolve_profile_dir(config)?;
    newest_state_file(&profile_dir)?.ok_or(TrackerError::NotFound { dir: profile_dir })
}

/// Pick the profile directory: the configured name if set, the sole
/// subdirectory if exactly one exists, the root itself for flat layouts.
pub fn resolve_profile_dir(config: &TrackerConfig) -> Result<PathBuf, TrackerError> {
    let root = &config.profile_root;
    if let Some(name) = &config.profile {
        return Ok(root.join(name));
    }

    let mut candidates: Vec<String> = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            candidates.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    candidates.sort();

    match candidates.as_slice() {
        [] => Ok(root.clone()),
        [only] => Ok(root.join(only)),
        _ => Err(TrackerError::AmbiguousProfile {
            root: root.clone(),
            candidates,
        }),
    }
}

/// Newest `*State.json` by modification time; ties broken by file name so
/// the answer stays deterministic on coarse-grained filesystems.
fn newest_state_file(dir: &Path) -> Result<Option<PathBuf>, TrackerError> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut newest: Option<(SystemTime, String, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || !is_state_file(&path) {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let candidate = (modified, name, path);
        if newest
            .as_ref()
            .is_none_or(|best| (candidate.0, &candidate.1) > (best.0, &best.1))
        {
            newest = Some(candidate);
        }
    }

    Ok(newest.map(|(_, _, path)| path))
}
