//! Search configuration.
//!
//! Loaded from the `[search]` section of a TOML config file when present;
//! every field has a serde default so a missing file or empty section
//! yields the documented defaults.

#![allow(clippy::module_name_repetitions)]

use crate::fusion::DEFAULT_RRF_K;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for the retrieval surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// RRF smoothing constant; higher values damp the impact of top ranks.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rrf_k: default_rrf_k(),
        }
    }
}

const fn default_rrf_k() -> usize {
    DEFAULT_RRF_K
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    search: SearchConfig,
}

/// Load search configuration from a TOML file.
///
/// A missing file is not an error; defaults apply. A present-but-malformed
/// file is an error, loudly, so typos do not silently revert tuning.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<SearchConfig> {
    if !path.exists() {
        return Ok(SearchConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    let parsed: ConfigFile =
        toml::from_str(&raw).with_context(|| format!("parse config file {}", path.display()))?;

    Ok(parsed.search)
}
