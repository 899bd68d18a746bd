//! Tracker configuration, stored as a TOML file under the user config
//! directory. Absent file means defaults; a present-but-broken file is an
//! error rather than a silent fallback.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Directory holding one subdirectory per server profile.
    pub profile_root: PathBuf,

    /// Server profile to track (e.g. "nvprod"). Only needed when the
    /// profile root holds more than one profile.
    pub profile: Option<String>,

    /// SQLite snapshot database location.
    pub database_path: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            profile_root: default_profile_root(),
            profile: None,
            database_path: default_database_path(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, TrackerError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        toml::from_str(&contents).map_err(|e| TrackerError::Config {
            reason: format!("{}: {e}", path.display()),
        })
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), TrackerError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self).map_err(|e| TrackerError::Config {
            reason: format!("{}: {e}", path.display()),
        })?;
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Default config file location under the user config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("snaptrack").join("config.toml"))
}

/// The game's per-OS state root. On Windows the client writes under the
/// LocalLow app-data tree; elsewhere (Proton prefixes, tests) fall back to
/// the local data dir equivalent.
fn default_profile_root() -> PathBuf {
    #[cfg(windows)]
    if let Ok(base) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(format!("{base}low"))
            .join("Second Dinner")
            .join("SNAP")
            .join("Standalone")
            .join("States");
    }

    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Second Dinner")
        .join("SNAP")
        .join("Standalone")
        .join("States")
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snaptrack")
        .join("snapshots.db")
}
