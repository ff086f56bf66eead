//! Integration tests for concentric ring estimation.

#[path = "../common/mod.rs"]
mod common;

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use common::{
    cell, data, overlap_actuals, overlap_sites, overlapping_regions, strip, strip_site, ts,
    without_site, NO2,
};
use region_estimators::config::{ConcentricSettings, EstimatorSettings};
use region_estimators::data::{Actual, EstimationData};
use region_estimators::prelude::*;

/// R0 .. R4 with sites `a`, `b` in R0 and `c` in R4.
fn outer_readings() -> Arc<EstimationData> {
    Arc::new(data(
        vec![strip_site("a", 0), strip_site("b", 0), strip_site("c", 4)],
        strip(5),
        vec![
            Actual::new(NO2, "a", ts(0), 10.0),
            Actual::new(NO2, "b", ts(0), 20.0),
            Actual::new(NO2, "c", ts(0), 60.0),
            Actual::new(NO2, "a", ts(1), 12.0),
            Actual::new("PM10_mean", "c", ts(0), 4.0),
        ],
    ))
}

#[test]
fn test_resolves_from_second_ring() {
    let estimator = ConcentricRegionsEstimator::new(outer_readings());
    let table = estimator.get_estimations(NO2, None, None, &[]).unwrap();

    // Rings 0 and 1 around R2 are empty; ring 2 is {R0, R4}
    let row = table.row("R2", ts(0)).unwrap();
    assert_eq!(row.value, Some(30.0));
    assert_eq!(row.extra_data, json!({ "rings": 2 }));
    assert_eq!(row.measurement, NO2);

    // Direct coverage wins at ring 0
    assert_eq!(table.value("R0", ts(0)), Some(15.0));
    assert_eq!(table.row("R0", ts(0)).unwrap().extra_data, json!({ "rings": 0 }));
    assert_eq!(table.value("R1", ts(0)), Some(15.0));
    assert_eq!(table.value("R3", ts(0)), Some(60.0));

    // Only `a` reports at ts(1)
    assert_eq!(table.value("R4", ts(1)), Some(12.0));
    assert_eq!(table.row("R4", ts(1)).unwrap().extra_data, json!({ "rings": 4 }));
}

#[test]
fn test_measurement_keyed_index() {
    let estimator = ConcentricRegionsEstimator::new(outer_readings());
    let table = estimator.get_estimations(NO2, None, None, &[]).unwrap();

    assert_eq!(estimator.result_index(), ResultIndex::MeasurementRegion);
    assert_eq!(
        table.index().key_names(),
        ["measurement", "region_id", "timestamp"]
    );
    assert_eq!(table.len(), 5 * 2);

    let keys: HashSet<_> = table
        .iter()
        .map(|r| (&r.measurement, &r.region_id, r.timestamp))
        .collect();
    assert_eq!(keys.len(), table.len());
    assert!(table.iter().all(|r| r.measurement == NO2));
}

#[test]
fn test_component_exhausted() {
    let mut regions = strip(3);
    regions.push(cell("ISLAND", 10.0, 10.0));
    let estimator = ConcentricRegionsEstimator::from_tables(
        vec![strip_site("s", 0)],
        regions,
        vec![Actual::new(NO2, "s", ts(0), 3.0)],
    )
    .unwrap();
    let table = estimator.get_estimations(NO2, None, None, &["s"]).unwrap();

    for row in &table {
        assert!(row.is_missing(), "{}", row.region_id);
        assert_eq!(row.extra_data, json!({ "rings": null }));
    }

    let table = estimator.get_estimations(NO2, None, None, &[]).unwrap();
    assert_eq!(table.value("R2", ts(0)), Some(3.0));
    assert_eq!(table.value("ISLAND", ts(0)), None);
}

#[test]
fn test_max_rings() {
    let settings = EstimatorSettings {
        concentric: ConcentricSettings { max_rings: Some(1) },
        ..EstimatorSettings::default()
    };
    let estimator = RegionEstimatorFactory::region_estimator(
        "concentric-regions",
        outer_readings(),
        settings,
    )
    .unwrap();
    let table = estimator.get_estimations(NO2, None, None, &[]).unwrap();

    assert_eq!(table.value("R1", ts(0)), Some(15.0));
    assert_eq!(table.value("R2", ts(0)), None);
}

#[test]
fn test_matches_other_strategies_on_covered_regions() {
    let data = outer_readings();
    let concentric = ConcentricRegionsEstimator::new(data.clone())
        .get_estimations(NO2, None, None, &[])
        .unwrap();
    let diffusion = DiffusionEstimator::new(data)
        .get_estimations(NO2, None, None, &[])
        .unwrap();

    for region_id in ["R0", "R4"] {
        assert_eq!(
            concentric.value(region_id, ts(0)),
            diffusion.value(region_id, ts(0))
        );
    }
}

#[test]
fn test_overlapping_regions_share_coverage() {
    let estimator = ConcentricRegionsEstimator::from_tables(
        overlap_sites(),
        overlapping_regions(),
        overlap_actuals(),
    )
    .unwrap();
    let table = estimator.get_estimations(NO2, None, None, &[]).unwrap();

    for region_id in ["AB", "AB2", "AB3"] {
        let row = table.row(region_id, ts(0)).unwrap();
        assert_eq!(row.value, Some(10.0), "{}", region_id);
        assert_eq!(row.extra_data, json!({ "rings": 0 }), "{}", region_id);
    }
    // Ring 1 holds AB, AB2, AB3 and PH; `x` counts once
    assert_eq!(table.value("IV", ts(0)), Some(25.0));
}

#[test]
fn test_ignore_equals_removal() {
    let actuals = overlap_actuals();

    let ignored = ConcentricRegionsEstimator::from_tables(
        overlap_sites(),
        overlapping_regions(),
        actuals.clone(),
    )
    .unwrap()
    .get_estimations(NO2, None, None, &["x"])
    .unwrap();
    let removed = ConcentricRegionsEstimator::from_tables(
        overlap_sites(),
        overlapping_regions(),
        without_site(&actuals, "x"),
    )
    .unwrap()
    .get_estimations(NO2, None, None, &[])
    .unwrap();

    assert_eq!(ignored, removed);
    assert_eq!(ignored.value("AB2", ts(0)), Some(30.0));
}
