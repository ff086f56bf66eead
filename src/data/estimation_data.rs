//! Shared, read-only estimation inputs.
//!
//! `EstimationData` owns the sites, regions and actuals tables together with
//! the two mappings derived from them at construction: region adjacency and
//! site → region attribution. Every estimator reads through it.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use geo::{Centroid, Contains, Intersects, Point};
use tracing::debug;

use crate::error::{EstimationError, EstimationResult, ValidationError};

use super::adjacency::AdjacencyIndex;
use super::types::{Actual, Region, Site};

/// Sites, regions and actuals plus derived adjacency.
#[derive(Debug, Clone)]
pub struct EstimationData {
    sites: Vec<Site>,
    regions: Vec<Region>,
    actuals: Vec<Actual>,

    /// Index: site id → position in `sites`
    site_index: HashMap<String, usize>,

    /// Index: region id → position in `regions`
    region_index: HashMap<String, usize>,

    /// Region centroids, parallel to `regions`
    centroids: Vec<Point<f64>>,

    adjacency: AdjacencyIndex,

    /// Site id → attributed region ids, sorted (absent when outside every region)
    site_regions: HashMap<String, Vec<String>>,

    /// Region id → attributed site ids, sorted
    region_sites: HashMap<String, Vec<String>>,

    /// Measurement names present in actuals
    measurements: BTreeSet<String>,
}

impl EstimationData {
    /// Validate the input tables and derive adjacency and site attribution.
    pub fn new(
        sites: Vec<Site>,
        regions: Vec<Region>,
        actuals: Vec<Actual>,
    ) -> EstimationResult<Self> {
        let mut site_index = HashMap::with_capacity(sites.len());
        for (i, site) in sites.iter().enumerate() {
            if site_index.insert(site.site_id.clone(), i).is_some() {
                return Err(ValidationError::DuplicateSite(site.site_id.clone()).into());
            }
        }

        let mut region_index = HashMap::with_capacity(regions.len());
        let mut centroids = Vec::with_capacity(regions.len());
        for (i, region) in regions.iter().enumerate() {
            if region_index.insert(region.region_id.clone(), i).is_some() {
                return Err(ValidationError::DuplicateRegion(region.region_id.clone()).into());
            }
            let centroid = region
                .geometry
                .centroid()
                .filter(|c| c.x().is_finite() && c.y().is_finite())
                .ok_or_else(|| ValidationError::EmptyGeometry(region.region_id.clone()))?;
            centroids.push(centroid);
        }

        let mut keys = HashSet::with_capacity(actuals.len());
        let mut actual_sites = HashSet::new();
        for actual in &actuals {
            if !keys.insert((&actual.measurement, &actual.site_id, actual.timestamp)) {
                return Err(ValidationError::DuplicateActual {
                    measurement: actual.measurement.clone(),
                    site_id: actual.site_id.clone(),
                    timestamp: actual.timestamp,
                }
                .into());
            }
            actual_sites.insert(actual.site_id.as_str());
        }
        if !actual_sites.is_empty() && !actual_sites.iter().any(|id| site_index.contains_key(*id))
        {
            return Err(ValidationError::UnresolvableSites {
                actual_sites: actual_sites.len(),
            }
            .into());
        }

        let measurements = actuals.iter().map(|a| a.measurement.clone()).collect();
        let adjacency = AdjacencyIndex::build(&regions);
        let (site_regions, region_sites) = attribute_sites(&sites, &regions);

        debug!(
            sites = sites.len(),
            regions = regions.len(),
            actuals = actuals.len(),
            adjacent_pairs = adjacency.edge_count(),
            attributed_sites = site_regions.len(),
            "Built estimation data"
        );

        Ok(Self {
            sites,
            regions,
            actuals,
            site_index,
            region_index,
            centroids,
            adjacency,
            site_regions,
            region_sites,
            measurements,
        })
    }

    // ========================================================================
    // Tables
    // ========================================================================

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn actuals(&self) -> &[Actual] {
        &self.actuals
    }

    pub fn site(&self, site_id: &str) -> Option<&Site> {
        self.site_index.get(site_id).map(|&i| &self.sites[i])
    }

    pub fn region(&self, region_id: &str) -> Option<&Region> {
        self.region_index.get(region_id).map(|&i| &self.regions[i])
    }

    /// All region ids, sorted.
    pub fn region_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.regions.iter().map(|r| r.region_id.clone()).collect();
        ids.sort();
        ids
    }

    /// Measurement names present in the actuals table, sorted.
    pub fn measurements(&self) -> impl Iterator<Item = &str> {
        self.measurements.iter().map(String::as_str)
    }

    pub fn has_measurement(&self, measurement: &str) -> bool {
        self.measurements.contains(measurement)
    }

    /// Fail with `MeasurementNotFound` unless the measurement exists.
    pub fn check_measurement(&self, measurement: &str) -> EstimationResult<()> {
        if self.has_measurement(measurement) {
            Ok(())
        } else {
            Err(EstimationError::MeasurementNotFound(measurement.to_string()))
        }
    }

    /// Representative point of a region.
    pub fn centroid(&self, region_id: &str) -> Option<Point<f64>> {
        self.region_index.get(region_id).map(|&i| self.centroids[i])
    }

    // ========================================================================
    // Adjacency
    // ========================================================================

    pub fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    /// Sorted neighbours of one region.
    pub fn neighbours(&self, region_id: &str) -> &[String] {
        self.adjacency.neighbours_of(region_id)
    }

    /// Regions adjacent to any of `region_ids`, excluding `region_ids` themselves.
    ///
    /// Sorted and duplicate-free; empty for empty input, islands and unknown ids.
    pub fn get_adjacent_regions<S: AsRef<str>>(&self, region_ids: &[S]) -> Vec<String> {
        self.adjacency.adjacent_to(region_ids)
    }

    // ========================================================================
    // Site attribution
    // ========================================================================

    /// Regions a site is attributed to, sorted. Empty when it lies outside
    /// every region.
    pub fn site_regions(&self, site_id: &str) -> &[String] {
        self.site_regions
            .get(site_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Is the site attributed to the region?
    pub fn site_in_region(&self, site_id: &str, region_id: &str) -> bool {
        self.site_regions(site_id).iter().any(|id| id == region_id)
    }

    /// Sites attributed to a region, sorted.
    pub fn region_sites(&self, region_id: &str) -> &[String] {
        self.region_sites
            .get(region_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ========================================================================
    // Actuals
    // ========================================================================

    /// Distinct timestamps of a measurement, sorted, optionally limited to one date.
    pub fn timestamps(
        &self,
        measurement: &str,
        date: Option<NaiveDate>,
    ) -> EstimationResult<Vec<NaiveDateTime>> {
        self.check_measurement(measurement)?;
        let timestamps: BTreeSet<NaiveDateTime> = self
            .actuals
            .iter()
            .filter(|a| a.measurement == measurement)
            .filter(|a| date.map_or(true, |d| a.timestamp.date() == d))
            .map(|a| a.timestamp)
            .collect();
        Ok(timestamps.into_iter().collect())
    }

    /// Readings of a measurement at a timestamp, keyed by site id.
    ///
    /// `site_ids` restricts the sites considered when given; `ignore_site_ids`
    /// are always excluded. Gaps (missing values) are skipped.
    pub fn get_actuals(
        &self,
        measurement: &str,
        site_ids: Option<&[&str]>,
        timestamp: NaiveDateTime,
        ignore_site_ids: &[&str],
    ) -> EstimationResult<BTreeMap<String, f64>> {
        self.check_measurement(measurement)?;
        let filter = SiteFilter::new(site_ids, ignore_site_ids);
        Ok(self.readings(measurement, timestamp, &filter, |_| true))
    }

    /// Readings from the sites attributed to one region.
    pub fn get_region_actuals(
        &self,
        measurement: &str,
        region_id: &str,
        site_ids: Option<&[&str]>,
        timestamp: NaiveDateTime,
        ignore_site_ids: &[&str],
    ) -> EstimationResult<BTreeMap<String, f64>> {
        self.check_measurement(measurement)?;
        if !self.region_index.contains_key(region_id) {
            return Err(EstimationError::RegionNotFound(region_id.to_string()));
        }
        let filter = SiteFilter::new(site_ids, ignore_site_ids);
        Ok(self.readings(measurement, timestamp, &filter, |site_id| {
            self.site_in_region(site_id, region_id)
        }))
    }

    /// Number of usable readings at a timestamp, optionally limited to the
    /// sites attributed to some regions.
    pub fn site_datapoint_count(
        &self,
        measurement: &str,
        timestamp: NaiveDateTime,
        region_ids: Option<&[&str]>,
        ignore_site_ids: &[&str],
    ) -> EstimationResult<usize> {
        self.check_measurement(measurement)?;
        let regions: Option<HashSet<&str>> = region_ids.map(|ids| ids.iter().copied().collect());
        let filter = SiteFilter::new(None, ignore_site_ids);
        let readings = self.readings(measurement, timestamp, &filter, |site_id| {
            regions.as_ref().map_or(true, |regions| {
                self.site_regions(site_id)
                    .iter()
                    .any(|id| regions.contains(id.as_str()))
            })
        });
        Ok(readings.len())
    }

    /// Readings at a timestamp grouped by attributed region.
    ///
    /// A site inside overlapping regions contributes to each of them. Values
    /// within a region are in site id order; unattributed sites are left out.
    pub(crate) fn readings_by_region(
        &self,
        measurement: &str,
        timestamp: NaiveDateTime,
        filter: &SiteFilter,
    ) -> HashMap<String, Vec<f64>> {
        let mut grouped: HashMap<String, Vec<f64>> = HashMap::new();
        for (site_id, value) in self.readings(measurement, timestamp, filter, |_| true) {
            for region_id in self.site_regions(&site_id) {
                grouped.entry(region_id.clone()).or_default().push(value);
            }
        }
        grouped
    }

    /// Readings passing the site filter and an extra site predicate.
    ///
    /// Rows for site ids absent from the sites table are skipped.
    pub(crate) fn readings(
        &self,
        measurement: &str,
        timestamp: NaiveDateTime,
        filter: &SiteFilter,
        keep: impl Fn(&str) -> bool,
    ) -> BTreeMap<String, f64> {
        self.actuals
            .iter()
            .filter(|a| a.measurement == measurement && a.timestamp == timestamp)
            .filter(|a| self.site_index.contains_key(&a.site_id))
            .filter(|a| filter.allows(&a.site_id) && keep(&a.site_id))
            .filter_map(|a| a.reading().map(|v| (a.site_id.clone(), v)))
            .collect()
    }
}

/// Site include/exclude lists for one estimation call.
#[derive(Debug, Clone, Default)]
pub struct SiteFilter {
    include: Option<HashSet<String>>,
    ignore: HashSet<String>,
}

impl SiteFilter {
    pub fn new(site_ids: Option<&[&str]>, ignore_site_ids: &[&str]) -> Self {
        Self {
            include: site_ids.map(|ids| ids.iter().map(|s| s.to_string()).collect()),
            ignore: ignore_site_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn allows(&self, site_id: &str) -> bool {
        !self.ignore.contains(site_id)
            && self
                .include
                .as_ref()
                .map_or(true, |include| include.contains(site_id))
    }
}

/// Attribute each site to the regions covering its location.
///
/// A site belongs to every region whose interior contains it, so overlapping
/// regions all see it. A point in no interior but on one or more boundaries
/// goes to the lexicographically first region id among those.
fn attribute_sites(
    sites: &[Site],
    regions: &[Region],
) -> (HashMap<String, Vec<String>>, HashMap<String, Vec<String>>) {
    let mut ordered: Vec<&Region> = regions.iter().collect();
    ordered.sort_by(|a, b| a.region_id.cmp(&b.region_id));

    let mut site_regions = HashMap::new();
    let mut region_sites: HashMap<String, Vec<String>> = HashMap::new();
    for site in sites {
        let mut covering: Vec<String> = ordered
            .iter()
            .filter(|region| region.geometry.contains(&site.location))
            .map(|region| region.region_id.clone())
            .collect();
        if covering.is_empty() {
            let boundary = ordered
                .iter()
                .find(|region| region.geometry.intersects(&site.location));
            match boundary {
                Some(region) => covering.push(region.region_id.clone()),
                None => {
                    debug!(site_id = %site.site_id, "Site lies outside every region");
                    continue;
                }
            }
        }
        for region_id in &covering {
            region_sites
                .entry(region_id.clone())
                .or_default()
                .push(site.site_id.clone());
        }
        site_regions.insert(site.site_id.clone(), covering);
    }
    for ids in region_sites.values_mut() {
        ids.sort();
    }
    (site_regions, region_sites)
}
