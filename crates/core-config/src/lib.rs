//! Configuration loading and parsing.
//!
//! Parses `oxidized.toml` (or an override path provided by the binary) and
//! extracts the `[input]` table that drives command resolution:
//!
//! ```toml
//! [input]
//! cancel_key = "<Esc>"
//! register_prefix = "\""
//! max_count = 999999
//! history_limit = 64
//! ```
//!
//! Every field has a default, so a missing file or table yields the stock
//! behavior. Key fields stay as notation strings here; the dispatcher parses
//! them when building its settings. Unknown fields are ignored to allow
//! forward evolution.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub input: InputConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// Key that aborts an in-progress resolution.
    #[serde(default = "InputConfig::default_cancel_key")]
    pub cancel_key: String,
    /// Key that introduces a register name (`"a`).
    #[serde(default = "InputConfig::default_register_prefix")]
    pub register_prefix: String,
    /// Upper bound for accumulated repeat counts.
    #[serde(default = "InputConfig::default_max_count")]
    pub max_count: u32,
    /// Raw keys retained per resolution attempt.
    #[serde(default = "InputConfig::default_history_limit")]
    pub history_limit: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            cancel_key: Self::default_cancel_key(),
            register_prefix: Self::default_register_prefix(),
            max_count: Self::default_max_count(),
            history_limit: Self::default_history_limit(),
        }
    }
}

impl InputConfig {
    fn default_cancel_key() -> String {
        "<Esc>".to_string()
    }
    fn default_register_prefix() -> String {
        "\"".to_string()
    }
    const fn default_max_count() -> u32 {
        999_999
    }
    const fn default_history_limit() -> usize {
        64
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("oxidized.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxidized").join("oxidized.toml");
    }
    PathBuf::from("oxidized.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(e) => {
            // Broken files fall back to defaults.
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config::default())
        }
    }
}
