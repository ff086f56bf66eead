//! Concentric ring estimation.
//!
//! For each region the search widens ring by ring: ring 0 is the region
//! itself, ring `k` holds the regions adjacent to ring `k - 1` that are not
//! in any earlier ring. The estimate is the mean of the readings from sites
//! attributed to the first ring that has any. A site covering several regions
//! of one ring counts once. Results are keyed by measurement as well as
//! region and timestamp.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::EstimatorSettings;
use crate::data::{Actual, EstimationData, Region, Site};
use crate::error::EstimationResult;

use super::{mean, EstimationQuery, RegionEstimate, RegionEstimator, ResultIndex};

#[derive(Debug, Clone)]
pub struct ConcentricRegionsEstimator {
    data: Arc<EstimationData>,
    settings: EstimatorSettings,
}

impl ConcentricRegionsEstimator {
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

    /// Widen rings around `region_id` until one carries readings.
    ///
    /// Returns the estimate and the ring it came from.
    fn search_rings(
        &self,
        region_id: &str,
        readings: &BTreeMap<String, f64>,
    ) -> Option<(f64, usize)> {
        let max_rings = self.settings.concentric.max_rings;
        let mut visited: HashSet<String> = HashSet::from([region_id.to_string()]);
        let mut ring = vec![region_id.to_string()];
        let mut level = 0;

        loop {
            let members: HashSet<&str> = ring.iter().map(String::as_str).collect();
            let values = readings
                .iter()
                .filter(|(site_id, _)| {
                    self.data
                        .site_regions(site_id)
                        .iter()
                        .any(|id| members.contains(id.as_str()))
                })
                .map(|(_, &value)| value);
            if let Some(value) = mean(values) {
                return Some((value, level));
            }
            if max_rings.is_some_and(|max| level >= max) {
                return None;
            }

            ring = self
                .data
                .get_adjacent_regions(ring.as_slice())
                .into_iter()
                .filter(|id| !visited.contains(id))
                .collect();
            if ring.is_empty() {
                return None;
            }
            visited.extend(ring.iter().cloned());
            level += 1;
        }
    }
}

impl RegionEstimator for ConcentricRegionsEstimator {
    fn slug(&self) -> &'static str {
        "concentric-regions"
    }

    fn estimation_data(&self) -> &EstimationData {
        &self.data
    }

    fn settings(&self) -> &EstimatorSettings {
        &self.settings
    }

    fn result_index(&self) -> ResultIndex {
        ResultIndex::MeasurementRegion
    }

    fn estimate_timestamp(
        &self,
        query: &EstimationQuery<'_>,
        timestamp: NaiveDateTime,
    ) -> Vec<(String, RegionEstimate)> {
        let readings = self
            .data
            .readings(query.measurement, timestamp, &query.sites, |_| true);

        query
            .region_ids
            .iter()
            .map(|region_id| {
                let estimate = match self.search_rings(region_id, &readings) {
                    Some((value, rings)) => RegionEstimate::new(value, json!({ "rings": rings })),
                    None => RegionEstimate::missing(json!({ "rings": Value::Null })),
                };
                if self.settings.verbose >= 2 {
                    debug!(
                        region_id = %region_id,
                        %timestamp,
                        value = ?estimate.value,
                        rings = %estimate.extra_data["rings"],
                        "Concentric estimate"
                    );
                }
                (region_id.clone(), estimate)
            })
            .collect()
    }
}
