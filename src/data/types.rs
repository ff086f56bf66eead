//! Input table rows: sites, regions and actual measurements.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use geo::{MultiPolygon, Point};

/// A sensor or monitoring site at a fixed location.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    /// Unique site identifier
    pub site_id: String,
    /// Site location
    pub location: Point<f64>,
    /// Free-form attributes carried alongside the site (name, type, ...)
    pub attributes: BTreeMap<String, String>,
}

impl Site {
    pub fn new(site_id: impl Into<String>, location: Point<f64>) -> Self {
        Self {
            site_id: site_id.into(),
            location,
            attributes: BTreeMap::new(),
        }
    }

    /// Create a site from x/y (longitude/latitude) coordinates.
    pub fn at(site_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(site_id, Point::new(x, y))
    }

    /// Attach an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// A polygon-bounded region.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Unique region identifier
    pub region_id: String,
    /// Region boundary
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    /// Create a region from a polygon or multipolygon.
    pub fn new(region_id: impl Into<String>, geometry: impl Into<MultiPolygon<f64>>) -> Self {
        Self {
            region_id: region_id.into(),
            geometry: geometry.into(),
        }
    }
}

/// One time-stamped reading of a measurement at a site.
///
/// `(measurement, site_id, timestamp)` is the natural key of the actuals
/// table. A `None` (or non-finite) value records a gap and never counts as
/// a reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Actual {
    pub measurement: String,
    pub site_id: String,
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

impl Actual {
    pub fn new(
        measurement: impl Into<String>,
        site_id: impl Into<String>,
        timestamp: NaiveDateTime,
        value: f64,
    ) -> Self {
        Self {
            measurement: measurement.into(),
            site_id: site_id.into(),
            timestamp,
            value: Some(value),
        }
    }

    /// A row with no recorded value.
    pub fn missing(
        measurement: impl Into<String>,
        site_id: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            measurement: measurement.into(),
            site_id: site_id.into(),
            timestamp,
            value: None,
        }
    }

    /// The value, if it is a usable reading.
    pub fn reading(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}
