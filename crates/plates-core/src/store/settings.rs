//! Store-wide settings (`settings.yaml` next to the templates)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the optional settings file inside the store
pub const SETTINGS_FILE: &str = "settings.yaml";

/// Settings read from `<store>/settings.yaml`
///
/// Every field is optional in the file; a missing file means defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Report every file and command as it happens
    pub verbose: bool,

    /// Forward captured subprocess stdout to the reporter
    pub stream_output: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            verbose: true,
            stream_output: false,
        }
    }
}

impl StoreSettings {
    /// Load settings from `path`, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}
