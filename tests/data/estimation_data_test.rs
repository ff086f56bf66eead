//! Integration tests for EstimationData lookups.

#[path = "../common/mod.rs"]
mod common;

use chrono::NaiveDate;

use common::{data, day, strip, strip_site, ts, NO2};
use region_estimators::data::{Actual, Site};
use region_estimators::error::EstimationError;

fn readings() -> region_estimators::data::EstimationData {
    data(
        vec![
            strip_site("a", 0),
            strip_site("b", 0),
            strip_site("c", 2),
            Site::at("outside", 50.0, 50.0),
        ],
        strip(3),
        vec![
            Actual::new(NO2, "a", ts(0), 10.0),
            Actual::new(NO2, "b", ts(0), 20.0),
            Actual::new(NO2, "c", ts(0), 30.0),
            Actual::new(NO2, "outside", ts(0), 40.0),
            Actual::missing(NO2, "c", ts(1)),
            Actual::new(NO2, "a", ts(1), 11.0),
            Actual::new("PM10_mean", "a", ts(0), 5.0),
        ],
    )
}

#[test]
fn test_get_actuals_filters() {
    let data = readings();

    let all = data.get_actuals(NO2, None, ts(0), &[]).unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all["outside"], 40.0);

    let subset = data.get_actuals(NO2, Some(&["a", "c"][..]), ts(0), &["c"]).unwrap();
    assert_eq!(subset.keys().collect::<Vec<_>>(), ["a"]);

    // Gap at ts(1) for c is not a reading
    let later = data.get_actuals(NO2, None, ts(1), &[]).unwrap();
    assert_eq!(later.keys().collect::<Vec<_>>(), ["a"]);

    assert!(data.get_actuals(NO2, None, ts(5), &[]).unwrap().is_empty());
}

#[test]
fn test_get_region_actuals() {
    let data = readings();

    let r0 = data.get_region_actuals(NO2, "R0", None, ts(0), &[]).unwrap();
    assert_eq!(r0.keys().collect::<Vec<_>>(), ["a", "b"]);

    let r1 = data.get_region_actuals(NO2, "R1", None, ts(0), &[]).unwrap();
    assert!(r1.is_empty());

    let err = data
        .get_region_actuals(NO2, "R9", None, ts(0), &[])
        .unwrap_err();
    assert_eq!(err, EstimationError::RegionNotFound("R9".into()));
}

#[test]
fn test_unknown_measurement() {
    let data = readings();

    let err = data.get_actuals("O3_mean", None, ts(0), &[]).unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, EstimationError::MeasurementNotFound(m) if m == "O3_mean"));
    assert!(data.timestamps("O3_mean", None).is_err());
}

#[test]
fn test_site_attribution() {
    let data = readings();

    assert_eq!(data.site_regions("a"), ["R0".to_string()]);
    assert_eq!(data.site_regions("c"), ["R2".to_string()]);
    assert!(data.site_regions("outside").is_empty());
    assert_eq!(data.region_sites("R0"), ["a".to_string(), "b".to_string()]);
    assert!(data.region_sites("R1").is_empty());
}

#[test]
fn test_site_datapoint_count() {
    let data = readings();

    assert_eq!(data.site_datapoint_count(NO2, ts(0), None, &[]).unwrap(), 4);
    assert_eq!(
        data.site_datapoint_count(NO2, ts(0), Some(&["R0"][..]), &["b"])
            .unwrap(),
        1
    );
    assert_eq!(
        data.site_datapoint_count(NO2, ts(1), Some(&["R2"][..]), &[])
            .unwrap(),
        0
    );
}

#[test]
fn test_timestamps_by_date() {
    let data = readings();

    assert_eq!(data.timestamps(NO2, None).unwrap(), vec![ts(0), ts(1)]);
    assert_eq!(data.timestamps(NO2, Some(day())).unwrap(), vec![ts(0), ts(1)]);
    let other_day = NaiveDate::from_ymd_opt(2019, 10, 16).unwrap();
    assert!(data.timestamps(NO2, Some(other_day)).unwrap().is_empty());
    assert_eq!(data.measurements().collect::<Vec<_>>(), ["NO2_mean", "PM10_mean"]);
}
