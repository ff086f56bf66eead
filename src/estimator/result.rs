//! Estimation result tables.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

/// Column names of every result table, in order.
pub const COLUMNS: [&str; 5] = ["measurement", "region_id", "timestamp", "value", "extra_data"];

/// Which columns key a result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultIndex {
    /// One row per (region_id, timestamp)
    Region,
    /// One row per (measurement, region_id, timestamp)
    MeasurementRegion,
}

impl ResultIndex {
    /// Names of the key columns.
    pub fn key_names(&self) -> &'static [&'static str] {
        match self {
            ResultIndex::Region => &["region_id", "timestamp"],
            ResultIndex::MeasurementRegion => &["measurement", "region_id", "timestamp"],
        }
    }
}

/// Estimate for one region at one timestamp, before it becomes a row.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionEstimate {
    /// `None` when the region could not be estimated
    pub value: Option<f64>,
    /// Strategy-specific provenance
    pub extra_data: Value,
}

impl RegionEstimate {
    pub fn new(value: f64, extra_data: Value) -> Self {
        Self {
            value: Some(value),
            extra_data,
        }
    }

    pub fn missing(extra_data: Value) -> Self {
        Self {
            value: None,
            extra_data,
        }
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationRow {
    pub measurement: String,
    pub region_id: String,
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
    pub extra_data: Value,
}

impl EstimationRow {
    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// Estimates for a set of regions and timestamps, sorted by the index key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationTable {
    index: ResultIndex,
    rows: Vec<EstimationRow>,
}

impl EstimationTable {
    pub fn new(index: ResultIndex) -> Self {
        Self {
            index,
            rows: Vec::new(),
        }
    }

    pub fn index(&self) -> ResultIndex {
        self.index
    }

    pub fn push(&mut self, row: EstimationRow) {
        self.rows.push(row);
    }

    /// Stable sort by the index key tuple.
    pub fn sort(&mut self) {
        match self.index {
            ResultIndex::Region => self.rows.sort_by(|a, b| {
                (&a.region_id, a.timestamp).cmp(&(&b.region_id, b.timestamp))
            }),
            ResultIndex::MeasurementRegion => self.rows.sort_by(|a, b| {
                (&a.measurement, &a.region_id, a.timestamp).cmp(&(
                    &b.measurement,
                    &b.region_id,
                    b.timestamp,
                ))
            }),
        }
    }

    pub fn rows(&self) -> &[EstimationRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<EstimationRow> {
        self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EstimationRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for a region at a timestamp.
    pub fn row(&self, region_id: &str, timestamp: NaiveDateTime) -> Option<&EstimationRow> {
        self.rows
            .iter()
            .find(|r| r.region_id == region_id && r.timestamp == timestamp)
    }

    /// Estimated value for a region at a timestamp; `None` when the row is
    /// absent or the estimate is missing.
    pub fn value(&self, region_id: &str, timestamp: NaiveDateTime) -> Option<f64> {
        self.row(region_id, timestamp).and_then(|r| r.value)
    }

    /// Rows for one region, in timestamp order.
    pub fn region_rows<'a>(
        &'a self,
        region_id: &'a str,
    ) -> impl Iterator<Item = &'a EstimationRow> + 'a {
        self.rows.iter().filter(move |r| r.region_id == region_id)
    }

    /// Rows with no estimate.
    pub fn missing(&self) -> impl Iterator<Item = &EstimationRow> {
        self.rows.iter().filter(|r| r.is_missing())
    }

    /// Serialize the rows as a JSON array of records.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.rows)
    }
}

impl<'a> IntoIterator for &'a EstimationTable {
    type Item = &'a EstimationRow;
    type IntoIter = std::slice::Iter<'a, EstimationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Plain-text rendering for diagnostics. Missing values print as `NaN`.
impl fmt::Display for EstimationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", COLUMNS.join(" | "))?;
        for row in &self.rows {
            let value = row
                .value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "NaN".to_string());
            write!(
                f,
                "\n{} | {} | {} | {} | {}",
                row.measurement,
                row.region_id,
                row.timestamp.format("%Y-%m-%d %H:%M:%S"),
                value,
                row.extra_data
            )?;
        }
        Ok(())
    }
}
