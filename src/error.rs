//! Error types for region estimation.
//!
//! Construction problems with the input tables surface as [`ValidationError`]
//! wrapped in [`EstimationError::Validation`]. Requests that name a measurement
//! or region that does not exist fail with the not-found variants. A region
//! that simply cannot be estimated is not an error: it yields a missing value
//! in the result table.

/// Result type for estimation operations.
pub type EstimationResult<T> = Result<T, EstimationError>;

/// Malformed or inconsistent input tables, detected when building
/// [`EstimationData`](crate::data::EstimationData).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Duplicate site id: {0}")]
    DuplicateSite(String),

    #[error("Duplicate region id: {0}")]
    DuplicateRegion(String),

    #[error("Duplicate actual for measurement '{measurement}', site '{site_id}' at {timestamp}")]
    DuplicateActual {
        measurement: String,
        site_id: String,
        timestamp: chrono::NaiveDateTime,
    },

    #[error("Region '{0}' has an empty or degenerate geometry")]
    EmptyGeometry(String),

    #[error("None of the {actual_sites} site ids referenced by actuals exist in the sites table")]
    UnresolvableSites { actual_sites: usize },
}

/// Errors raised by estimators, the data layer and the strategy factory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimationError {
    #[error("Invalid input data: {0}")]
    Validation(#[from] ValidationError),

    #[error("Measurement not found in actuals: {0}")]
    MeasurementNotFound(String),

    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Unsupported estimation strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Invalid estimator settings: {0}")]
    InvalidSettings(String),
}

impl EstimationError {
    /// Is this one of the not-found errors?
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EstimationError::MeasurementNotFound(_) | EstimationError::RegionNotFound(_)
        )
    }
}
