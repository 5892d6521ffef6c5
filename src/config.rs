//! Sheet Configuration
//!
//! Layout defaults live here instead of in the composer, and the verbose
//! switch is passed around explicitly rather than held globally.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const MAX_INITIATIVE_SLOTS: u32 = 100;
pub const MAX_PER_ROW: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    OutOfRange(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetConfig {
    /// Initiative column numbered from this value down to 1.
    #[serde(default = "default_initiative_slots")]
    pub initiative_slots: u32,
    /// Stat blocks per grid row.
    #[serde(default = "default_per_row")]
    pub per_row: usize,
    #[serde(default)]
    pub verbose: bool,
}

fn default_initiative_slots() -> u32 { 30 }
fn default_per_row() -> usize { 2 }

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            initiative_slots: default_initiative_slots(),
            per_row: default_per_row(),
            verbose: false,
        }
    }
}

impl SheetConfig {
    /// Create from user-supplied layout values with validation
    pub fn from_user(initiative_slots: u32, per_row: usize) -> Result<Self, &'static str> {
        let config = Self {
            initiative_slots,
            per_row,
            verbose: false,
        };
        config.check()?;
        Ok(config)
    }

    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.check().map_err(ConfigError::OutOfRange)?;
        Ok(config)
    }

    pub fn with_verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    fn check(&self) -> Result<(), &'static str> {
        if self.initiative_slots < 1 || self.initiative_slots > MAX_INITIATIVE_SLOTS {
            return Err("initiativeSlots must be between 1 and 100");
        }
        if self.per_row < 1 || self.per_row > MAX_PER_ROW {
            return Err("perRow must be between 1 and 6");
        }
        Ok(())
    }
}
