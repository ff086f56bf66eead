//! Inverse-distance-weighted estimation.
//!
//! Each region's estimate is the weighted mean of every eligible site
//! reading, with weight `1 / d²` for the distance `d` from the site to the
//! region centroid. Distances are floored at `distance.min_distance` (and
//! never below the smallest positive `f64`) so a site sitting on the centroid
//! cannot divide by zero; there is no other special case for sites inside the
//! region.
//!
//! Weights are scaled by the nearest site's squared distance before summing,
//! so the nearest site weighs exactly 1 and very large distances cannot
//! overflow to an infinite square.

use std::sync::Arc;

use chrono::NaiveDateTime;
use geo::EuclideanDistance;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::EstimatorSettings;
use crate::data::{Actual, EstimationData, Region, Site};
use crate::error::EstimationResult;

use super::{EstimationQuery, RegionEstimate, RegionEstimator};

#[derive(Debug, Clone)]
pub struct DistanceSimpleEstimator {
    data: Arc<EstimationData>,
    settings: EstimatorSettings,
}

impl DistanceSimpleEstimator {
    pub fn new(data: Arc<EstimationData>) -> Self {
        Self {
            data,
            settings: EstimatorSettings::default(),
        }
    }

    /// Build the estimation data and the estimator in one step.
    pub fn from_tables(
        sites: Vec<Site>,
        regions: Vec<Region>,
        actuals: Vec<Actual>,
    ) -> EstimationResult<Self> {
        Ok(Self::new(Arc::new(EstimationData::new(
            sites, regions, actuals,
        )?)))
    }

    pub fn with_settings(mut self, settings: EstimatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.settings.verbose = verbose;
        self
    }

    fn estimate_region(
        &self,
        region_id: &str,
        readings: &[(&Site, f64)],
    ) -> RegionEstimate {
        let Some(centroid) = self.data.centroid(region_id) else {
            return RegionEstimate::missing(json!({ "site_distances": {} }));
        };
        let floor = self.settings.distance.min_distance.max(f64::MIN_POSITIVE);

        let mut distances = Map::new();
        let measured: Vec<(f64, f64)> = readings
            .iter()
            .map(|&(site, value)| {
                let distance = site.location.euclidean_distance(&centroid);
                distances.insert(site.site_id.clone(), json!(distance));
                (distance.max(floor), value)
            })
            .collect();
        let nearest = measured
            .iter()
            .map(|&(distance, _)| distance)
            .fold(f64::INFINITY, f64::min);

        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for &(distance, value) in &measured {
            let weight = (nearest / distance).powi(2);
            weighted_sum += weight * value;
            total_weight += weight;
        }
        let extra_data = json!({ "site_distances": Value::Object(distances) });

        if total_weight > 0.0 {
            RegionEstimate::new(weighted_sum / total_weight, extra_data)
        } else {
            RegionEstimate::missing(extra_data)
        }
    }
}

impl RegionEstimator for DistanceSimpleEstimator {
    fn slug(&self) -> &'static str {
        "distance-simple"
    }

    fn estimation_data(&self) -> &EstimationData {
        &self.data
    }

    fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    fn estimate_timestamp(
        &self,
        query: &EstimationQuery<'_>,
        timestamp: NaiveDateTime,
    ) -> Vec<(String, RegionEstimate)> {
        let readings = self
            .data
            .readings(query.measurement, timestamp, &query.sites, |_| true);
        // Sorted by site id, so summation order is fixed
        let sites: Vec<(&Site, f64)> = readings
            .iter()
            .filter_map(|(site_id, &value)| self.data.site(site_id).map(|site| (site, value)))
            .collect();

        query
            .region_ids
            .iter()
            .map(|region_id| {
                let estimate = self.estimate_region(region_id, &sites);
                if self.settings.verbose >= 2 {
                    debug!(
                        region_id = %region_id,
                        %timestamp,
                        value = ?estimate.value,
                        sites = sites.len(),
                        "Distance-weighted estimate"
                    );
                }
                (region_id.clone(), estimate)
            })
            .collect()
    }
}
