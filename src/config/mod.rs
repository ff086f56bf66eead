//! Configuration module for region estimators.
//!
//! Handles estimator settings loaded from TOML.

mod settings;

pub use settings::{
    ConcentricSettings, DiffusionSettings, DistanceSettings, EstimatorSettings, SettingsError,
};
