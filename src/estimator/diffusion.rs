//! Diffusion of site readings along region adjacency.
//!
//! Regions with attributed readings are resolved up front to the mean of
//! those readings (level 0). Each later pass resolves every unresolved region
//! that has at least one neighbour resolved in an earlier pass, to the mean
//! of those neighbours' values. A region resolved during a pass stays
//! in-progress until the pass ends, so within a pass no region reads another
//! region's fresh value and the outcome does not depend on visiting order.
//!
//! Every pass either resolves a new region or ends the propagation, so the
//! process terminates on any graph, cycles included. Regions in a component
//! with no readings, and islands without readings, stay missing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::EstimatorSettings;
use crate::data::{Actual, EstimationData, Region, Site};
use crate::error::EstimationResult;

use super::{mean, EstimationQuery, RegionEstimate, RegionEstimator};

/// Per-region state during one propagation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Unresolved,
    /// Resolved in the current pass; invisible to neighbours until it ends
    InProgress { value: f64 },
    Resolved { value: f64, level: usize },
}

/// Region arena for one estimation call: ids, neighbour positions and markers.
struct Propagation<'a> {
    region_ids: Vec<&'a str>,
    neighbours: Vec<Vec<usize>>,
    markers: Vec<Marker>,
}

impl<'a> Propagation<'a> {
    fn new(data: &'a EstimationData) -> Self {
        let mut region_ids: Vec<&str> = data
            .regions()
            .iter()
            .map(|r| r.region_id.as_str())
            .collect();
        region_ids.sort();

        let position: HashMap<&str, usize> = region_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        let neighbours = region_ids
            .iter()
            .map(|id| {
                data.neighbours(id)
                    .iter()
                    .filter_map(|n| position.get(n.as_str()).copied())
                    .collect()
            })
            .collect();

        let markers = vec![Marker::Unresolved; region_ids.len()];
        Self {
            region_ids,
            neighbours,
            markers,
        }
    }

    /// Resolve regions that have direct readings.
    fn seed(&mut self, readings: &HashMap<String, Vec<f64>>) {
        for (i, id) in self.region_ids.iter().enumerate() {
            let direct = readings.get(*id).and_then(|values| mean(values.iter().copied()));
            if let Some(value) = direct {
                self.markers[i] = Marker::Resolved { value, level: 0 };
            }
        }
    }

    /// Run propagation passes until nothing changes or `max_passes` is reached.
    ///
    /// Returns the number of passes that resolved at least one region.
    fn run(&mut self, max_passes: Option<usize>) -> usize {
        let mut level = 0;
        while max_passes.map_or(true, |max| level < max) {
            if !self.pass(level + 1) {
                break;
            }
            level += 1;
        }
        level
    }

    fn pass(&mut self, level: usize) -> bool {
        let mut progressed = false;
        for i in 0..self.markers.len() {
            if self.markers[i] != Marker::Unresolved {
                continue;
            }
            let resolved_neighbours =
                self.neighbours[i]
                    .iter()
                    .filter_map(|&j| match self.markers[j] {
                        Marker::Resolved { value, .. } => Some(value),
                        Marker::Unresolved | Marker::InProgress { .. } => None,
                    });
            if let Some(value) = mean(resolved_neighbours) {
                self.markers[i] = Marker::InProgress { value };
                progressed = true;
            }
        }

        for marker in &mut self.markers {
            if let Marker::InProgress { value } = *marker {
                *marker = Marker::Resolved { value, level };
            }
        }
        progressed
    }

    fn estimate(&self, region_id: &str) -> RegionEstimate {
        let marker = self
            .region_ids
            .binary_search(&region_id)
            .map(|i| self.markers[i])
            .unwrap_or(Marker::Unresolved);
        match marker {
            Marker::Resolved { value, level } => {
                RegionEstimate::new(value, json!({ "diffusion_level": level }))
            }
            Marker::Unresolved | Marker::InProgress { .. } => {
                RegionEstimate::missing(json!({ "diffusion_level": Value::Null }))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiffusionEstimator {
    data: Arc<EstimationData>,
    settings: EstimatorSettings,
}

impl DiffusionEstimator {
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
}

impl RegionEstimator for DiffusionEstimator {
    fn slug(&self) -> &'static str {
        "diffusion"
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
            .readings_by_region(query.measurement, timestamp, &query.sites);

        let mut propagation = Propagation::new(&self.data);
        propagation.seed(&readings);
        let passes = propagation.run(self.settings.diffusion.max_passes);

        if self.settings.verbose >= 2 {
            debug!(
                %timestamp,
                covered_regions = readings.len(),
                passes,
                "Diffusion finished"
            );
        }

        query
            .region_ids
            .iter()
            .map(|region_id| (region_id.clone(), propagation.estimate(region_id)))
            .collect()
    }
}
