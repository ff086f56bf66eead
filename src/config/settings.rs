//! TOML-based estimator configuration.
//!
//! Supports a config file (region_estimators.toml); every key is optional.
//!
//! Example configuration:
//! ```toml
//! verbose = 1
//!
//! [distance]
//! min_distance = 1e-9
//!
//! [diffusion]
//! max_passes = 50
//!
//! [concentric]
//! max_rings = 10
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EstimatorSettings {
    /// Diagnostic level: 0 silent, 1 summaries, 2 and above per-region detail.
    /// Never changes results.
    pub verbose: u8,

    /// Distance-weighting settings.
    pub distance: DistanceSettings,

    /// Diffusion settings.
    pub diffusion: DiffusionSettings,

    /// Concentric ring settings.
    pub concentric: ConcentricSettings,
}

/// Distance-weighting settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DistanceSettings {
    /// Floor applied to site → region distances before weighting.
    pub min_distance: f64,
}

impl Default for DistanceSettings {
    fn default() -> Self {
        Self { min_distance: 1e-9 }
    }
}

/// Diffusion settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DiffusionSettings {
    /// Stop after this many propagation passes (unbounded when unset).
    pub max_passes: Option<usize>,
}

/// Concentric ring settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConcentricSettings {
    /// Largest ring to search (unbounded when unset).
    pub max_rings: Option<usize>,
}

impl EstimatorSettings {
    /// Default settings with a verbosity level.
    pub fn with_verbose(verbose: u8) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: EstimatorSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `REGION_ESTIMATORS_CONFIG`
    /// 2. `./region_estimators.toml`
    /// 3. `~/.config/region_estimators/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("REGION_ESTIMATORS_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("region_estimators.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("region_estimators").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(EstimatorSettings::default())
    }

    /// Reject values the estimators cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let min_distance = self.distance.min_distance;
        if !min_distance.is_finite() || min_distance <= 0.0 {
            return Err(SettingsError::InvalidConfig(format!(
                "distance.min_distance must be a positive number, got {}",
                min_distance
            )));
        }
        if self.diffusion.max_passes == Some(0) {
            return Err(SettingsError::InvalidConfig(
                "diffusion.max_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
