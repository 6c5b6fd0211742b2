//! # Settings
//!
//! Counter-specific configuration read from a TOML file. Every key is
//! optional; a missing file means defaults.
//!
//! ```toml
//! max_denominator = 16
//! output_dir = "orders"
//!
//! [limits]
//! max_lengths = 4
//! max_items = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{LayoutError, LayoutResult};
use crate::fraction::DEFAULT_MAX_DENOMINATOR;
use crate::layout::RowLimits;

/// Upper bound accepted for `max_denominator`
const MAX_DENOMINATOR_LIMIT: u32 = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-row bounds on lengths and items
    pub limits: RowLimits,
    /// Largest denominator used when labelling sizes
    pub max_denominator: u32,
    /// Where saved configurations and reports go
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            limits: RowLimits::default(),
            max_denominator: DEFAULT_MAX_DENOMINATOR,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> LayoutResult<Self> {
        let settings: Settings = toml::from_str(content).map_err(LayoutError::serialization)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> LayoutResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| LayoutError::file_error("read settings", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> LayoutResult<()> {
        self.limits.validate()?;
        if !(2..=MAX_DENOMINATOR_LIMIT).contains(&self.max_denominator) {
            return Err(LayoutError::invalid_input(
                "max_denominator",
                self.max_denominator.to_string(),
                format!("Must be between 2 and {}", MAX_DENOMINATOR_LIMIT),
            ));
        }
        Ok(())
    }
}
