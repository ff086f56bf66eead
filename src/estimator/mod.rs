//! Region estimation strategies.
//!
//! Every strategy implements [`RegionEstimator`] over a shared
//! [`EstimationData`]:
//!
//! - `distance-simple`: inverse-distance weighting from sites to region centroids
//! - `diffusion`: values spread outward along region adjacency, pass by pass
//! - `concentric-regions`: widening adjacency rings around each region
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use region_estimators::prelude::*;
//!
//! let data = Arc::new(EstimationData::new(sites, regions, actuals)?);
//! let estimator = RegionEstimatorFactory::region_estimator("diffusion", data, EstimatorSettings::default())?;
//! let table = estimator.get_estimations("NO2_mean", None, Some(date), &[])?;
//! ```

mod concentric;
mod diffusion;
mod distance_simple;
pub mod factory;
pub mod result;

pub use concentric::ConcentricRegionsEstimator;
pub use diffusion::DiffusionEstimator;
pub use distance_simple::DistanceSimpleEstimator;
pub use factory::{get_classname, RegionEstimatorFactory};
pub use result::{EstimationRow, EstimationTable, RegionEstimate, ResultIndex, COLUMNS};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::config::EstimatorSettings;
use crate::data::{EstimationData, SiteFilter};
use crate::error::{EstimationError, EstimationResult};

/// A full estimation request.
///
/// `get_estimations` covers the common case; the request adds a region subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimationRequest {
    pub measurement: String,
    /// Sites to consider; `None` means all sites
    pub site_ids: Option<Vec<String>>,
    /// Day to estimate; `None` means every timestamp
    pub date: Option<NaiveDate>,
    /// Sites always excluded
    pub ignore_site_ids: Vec<String>,
    /// Regions to report; `None` means all regions
    pub region_ids: Option<Vec<String>>,
}

impl EstimationRequest {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            ..Self::default()
        }
    }

    pub fn sites<I, S>(mut self, site_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.site_ids = Some(site_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn ignore<I, S>(mut self, site_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_site_ids = site_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn regions<I, S>(mut self, region_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.region_ids = Some(region_ids.into_iter().map(Into::into).collect());
        self
    }

    /// Site include/exclude filter for this request.
    pub fn site_filter(&self) -> SiteFilter {
        let include: Option<Vec<&str>> = self
            .site_ids
            .as_ref()
            .map(|ids| ids.iter().map(String::as_str).collect());
        let ignore: Vec<&str> = self.ignore_site_ids.iter().map(String::as_str).collect();
        SiteFilter::new(include.as_deref(), &ignore)
    }

    /// Regions to report, sorted and validated against the data.
    fn resolve_regions(&self, data: &EstimationData) -> EstimationResult<Vec<String>> {
        match &self.region_ids {
            None => Ok(data.region_ids()),
            Some(ids) => {
                let mut resolved = Vec::with_capacity(ids.len());
                for id in ids {
                    if data.region(id).is_none() {
                        return Err(EstimationError::RegionNotFound(id.clone()));
                    }
                    resolved.push(id.clone());
                }
                resolved.sort();
                resolved.dedup();
                Ok(resolved)
            }
        }
    }
}

/// Per-call inputs handed to a strategy for each timestamp.
#[derive(Debug, Clone)]
pub struct EstimationQuery<'a> {
    pub measurement: &'a str,
    /// Regions to estimate, sorted
    pub region_ids: Vec<String>,
    pub sites: SiteFilter,
}

/// Arithmetic mean; `None` for no values.
pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Estimation strategy contract.
///
/// Implementors provide `estimate_timestamp`; request validation, the
/// timestamp loop and result assembly are shared.
pub trait RegionEstimator: std::fmt::Debug + Send + Sync {
    /// Strategy slug, as accepted by the factory.
    fn slug(&self) -> &'static str;

    fn estimation_data(&self) -> &EstimationData;

    fn settings(&self) -> &EstimatorSettings;

    /// Key layout of the tables this strategy produces.
    fn result_index(&self) -> ResultIndex {
        ResultIndex::Region
    }

    /// Estimate every region in `query` at one timestamp.
    ///
    /// Returns one estimate per requested region, in `query.region_ids` order.
    fn estimate_timestamp(
        &self,
        query: &EstimationQuery<'_>,
        timestamp: NaiveDateTime,
    ) -> Vec<(String, RegionEstimate)>;

    /// Regions adjacent to any of `region_ids`, sorted, excluding the inputs.
    fn get_adjacent_regions(&self, region_ids: &[&str]) -> Vec<String> {
        self.estimation_data().get_adjacent_regions(region_ids)
    }

    /// Estimate all regions for a measurement.
    ///
    /// `site_ids` of `None` considers every site; `date` of `None` covers every
    /// timestamp of the measurement. Fails with `MeasurementNotFound` if the
    /// measurement never occurs in the actuals.
    fn get_estimations(
        &self,
        measurement: &str,
        site_ids: Option<&[&str]>,
        date: Option<NaiveDate>,
        ignore_site_ids: &[&str],
    ) -> EstimationResult<EstimationTable> {
        let mut request = EstimationRequest::new(measurement).ignore(ignore_site_ids.iter().copied());
        if let Some(site_ids) = site_ids {
            request = request.sites(site_ids.iter().copied());
        }
        request.date = date;
        self.estimate(&request)
    }

    /// Estimate according to a full request.
    fn estimate(&self, request: &EstimationRequest) -> EstimationResult<EstimationTable> {
        let data = self.estimation_data();
        let timestamps = data.timestamps(&request.measurement, request.date)?;
        let query = EstimationQuery {
            measurement: &request.measurement,
            region_ids: request.resolve_regions(data)?,
            sites: request.site_filter(),
        };

        let mut table = EstimationTable::new(self.result_index());
        for &timestamp in &timestamps {
            for (region_id, estimate) in self.estimate_timestamp(&query, timestamp) {
                table.push(EstimationRow {
                    measurement: request.measurement.clone(),
                    region_id,
                    timestamp,
                    value: estimate.value,
                    extra_data: estimate.extra_data,
                });
            }
        }
        table.sort();

        if self.settings().verbose >= 1 {
            info!(
                strategy = self.slug(),
                measurement = %request.measurement,
                timestamps = timestamps.len(),
                regions = query.region_ids.len(),
                missing = table.missing().count(),
                "Estimation complete"
            );
        }
        Ok(table)
    }
}
