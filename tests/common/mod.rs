//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use geo::Rect;

use region_estimators::data::{Actual, EstimationData, Region, Site};

pub const NO2: &str = "NO2_mean";

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 10, 15).unwrap()
}

pub fn ts(hour: u32) -> NaiveDateTime {
    day().and_hms_opt(hour, 0, 0).unwrap()
}

/// Axis-aligned rectangular region.
pub fn rect(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Region {
    Region::new(id, Rect::new((x0, y0), (x1, y1)).to_polygon())
}

/// Unit square with its lower-left corner at (`col`, `row`).
pub fn cell(id: &str, col: f64, row: f64) -> Region {
    rect(id, col, row, col + 1.0, row + 1.0)
}

/// Regions with three identical geometries.
///
/// ```text
///   y=2 ┌────┬────┬────┐
///       │ DD │ AB │ IV │    AB, AB2, AB3 share one square
///   y=1 │    ├────┴────┤
///       │    │   PH    │
///   y=0 └────┴─────────┘
///      x=0  x=1  x=2  x=3
/// ```
pub fn overlapping_regions() -> Vec<Region> {
    vec![
        rect("AB", 1.0, 1.0, 2.0, 2.0),
        rect("AB2", 1.0, 1.0, 2.0, 2.0),
        rect("AB3", 1.0, 1.0, 2.0, 2.0),
        rect("DD", 0.0, 0.0, 1.0, 2.0),
        rect("IV", 2.0, 1.0, 3.0, 2.0),
        rect("PH", 1.0, 0.0, 3.0, 1.0),
    ]
}

/// Sites for [`overlapping_regions`]: `x` inside AB/AB2/AB3, `y` in DD,
/// `z` in PH.
pub fn overlap_sites() -> Vec<Site> {
    vec![
        Site::at("x", 1.5, 1.5),
        Site::at("y", 0.5, 0.5),
        Site::at("z", 2.5, 0.5),
    ]
}

/// Readings `x = 10`, `y = 20`, `z = 40` at `ts(0)`.
pub fn overlap_actuals() -> Vec<Actual> {
    vec![
        Actual::new(NO2, "x", ts(0), 10.0),
        Actual::new(NO2, "y", ts(0), 20.0),
        Actual::new(NO2, "z", ts(0), 40.0),
    ]
}

/// Actuals without any rows for `site_id`.
pub fn without_site(actuals: &[Actual], site_id: &str) -> Vec<Actual> {
    actuals
        .iter()
        .filter(|a| a.site_id != site_id)
        .cloned()
        .collect()
}

/// A row of unit cells `R0 | R1 | ... ` along the x axis.
pub fn strip(count: usize) -> Vec<Region> {
    (0..count)
        .map(|i| cell(&format!("R{}", i), i as f64, 0.0))
        .collect()
}

/// Site at the centre of the strip cell `i`.
pub fn strip_site(id: &str, i: usize) -> Site {
    Site::at(id, i as f64 + 0.5, 0.5)
}

pub fn data(sites: Vec<Site>, regions: Vec<Region>, actuals: Vec<Actual>) -> EstimationData {
    EstimationData::new(sites, regions, actuals).expect("valid estimation data")
}
