//! # Region Estimators
//!
//! Estimates a measurement for every geographic region from point readings
//! taken at monitoring sites.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Input tables (sites, regions, actuals)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation, adjacency, site attribution]
//! ┌─────────────────────────────────────────────────────────┐
//! │              EstimationData (shared, read-only)          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [RegionEstimatorFactory / strategy]
//! ┌─────────────────────────────────────────────────────────┐
//! │   distance-simple  │   diffusion   │  concentric-regions │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    EstimationTable                       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Regions that cannot be estimated produce a missing value (`None`) rather
//! than an error.

pub mod config;
pub mod data;
pub mod error;
pub mod estimator;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::EstimatorSettings;
    pub use crate::data::{Actual, EstimationData, Region, Site};
    pub use crate::error::{EstimationError, EstimationResult, ValidationError};
    pub use crate::estimator::{
        get_classname, ConcentricRegionsEstimator, DiffusionEstimator, DistanceSimpleEstimator,
        EstimationRequest, EstimationRow, EstimationTable, RegionEstimator,
        RegionEstimatorFactory, ResultIndex,
    };
}

// Also export at crate root for convenience
pub use error::{EstimationError, EstimationResult};
pub use estimator::{get_classname, RegionEstimator, RegionEstimatorFactory};
