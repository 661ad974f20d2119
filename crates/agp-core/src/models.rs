use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::ranges::RangeBucket;

/// Default header of the timestamp column in device exports.
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "Device Timestamp";

/// Default header of the glucose column in device exports.
pub const DEFAULT_VALUE_COLUMN: &str = "Historic Glucose mg/dL";

/// A single glucose measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Wall-clock time of the measurement, exactly as recorded by the device.
    pub timestamp: NaiveDateTime,
    /// Glucose concentration in mg/dL. Not range-checked.
    pub glucose_mg_dl: f64,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, glucose_mg_dl: f64) -> Self {
        Self {
            timestamp,
            glucose_mg_dl,
        }
    }
}

/// All readings for one subject, in the order they were ingested.
///
/// A series is immutable once built; every derived value is computed on
/// demand by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    readings: Vec<Reading>,
}

impl Series {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    /// Readings in insertion order.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Iterator over the glucose values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.readings.iter().map(|r| r.glucose_mg_dl)
    }

    /// Earliest timestamp in the series, regardless of insertion order.
    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings.iter().map(|r| r.timestamp).min()
    }

    /// Latest timestamp in the series, regardless of insertion order.
    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.readings.iter().map(|r| r.timestamp).max()
    }
}

impl FromIterator<Reading> for Series {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Which source columns hold the timestamp and the glucose value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub timestamp_column: String,
    pub value_column: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            timestamp_column: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
        }
    }
}

/// Percentage of readings falling in each [`RangeBucket`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketPercentages {
    pub very_low: f64,
    pub low: f64,
    pub target: f64,
    pub high: f64,
    pub very_high: f64,
}

impl BucketPercentages {
    pub fn get(&self, bucket: RangeBucket) -> f64 {
        match bucket {
            RangeBucket::VeryLow => self.very_low,
            RangeBucket::Low => self.low,
            RangeBucket::Target => self.target,
            RangeBucket::High => self.high,
            RangeBucket::VeryHigh => self.very_high,
        }
    }

    pub fn set(&mut self, bucket: RangeBucket, value: f64) {
        match bucket {
            RangeBucket::VeryLow => self.very_low = value,
            RangeBucket::Low => self.low = value,
            RangeBucket::Target => self.target = value,
            RangeBucket::High => self.high = value,
            RangeBucket::VeryHigh => self.very_high = value,
        }
    }

    /// `(bucket, percentage)` pairs in stacking order.
    pub fn iter(&self) -> impl Iterator<Item = (RangeBucket, f64)> + '_ {
        RangeBucket::ALL.into_iter().map(|b| (b, self.get(b)))
    }

    /// Sum over all buckets. Below 100 only when negative readings exist.
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, pct)| pct).sum()
    }
}

/// Distribution statistics over a whole series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    /// Number of readings in the series.
    pub total_readings: usize,
    /// Time-in-range percentages.
    pub ranges: BucketPercentages,
    /// Arithmetic mean glucose in mg/dL.
    pub mean: f64,
    /// Sample standard deviation in mg/dL, `None` with fewer than two readings.
    pub std_dev: Option<f64>,
    /// Coefficient of variation in percent, `None` when undefined.
    pub cv_percent: Option<f64>,
}

impl SummaryResult {
    /// Glucose Management Indicator derived from [`SummaryResult::mean`].
    pub fn gmi(&self) -> f64 {
        crate::ranges::gmi(self.mean)
    }
}

/// Extrema and mean for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyProfile {
    pub date: NaiveDate,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Number of readings recorded on this date.
    pub count: usize,
}

/// Percentile band for one time-of-day coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgpPoint {
    /// Hours since midnight, `hour + minute / 60`, in `[0, 24)`.
    pub time_of_day: f64,
    pub p5: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    /// Number of readings contributing to this row.
    pub count: usize,
}

/// The full AGP curve, ascending by time of day.
pub type AgpCurve = Vec<AgpPoint>;

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_series_preserves_insertion_order() {
        let series: Series = vec![
            Reading::new(ts("2024-01-02 08:00"), 120.0),
            Reading::new(ts("2024-01-01 08:00"), 90.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(series.len(), 2);
        assert_eq!(series.readings()[0].glucose_mg_dl, 120.0);
        assert_eq!(series.values().collect::<Vec<_>>(), vec![120.0, 90.0]);
    }

    #[test]
    fn test_series_time_span_ignores_order() {
        let series = Series::new(vec![
            Reading::new(ts("2024-01-02 08:00"), 120.0),
            Reading::new(ts("2024-01-01 06:30"), 90.0),
            Reading::new(ts("2024-01-03 23:45"), 150.0),
        ]);
        assert_eq!(series.first_timestamp(), Some(ts("2024-01-01 06:30")));
        assert_eq!(series.last_timestamp(), Some(ts("2024-01-03 23:45")));
    }

    #[test]
    fn test_empty_series() {
        let series = Series::default();
        assert!(series.is_empty());
        assert!(series.first_timestamp().is_none());
    }

    #[test]
    fn test_column_mapping_default() {
        let mapping = ColumnMapping::default();
        assert_eq!(mapping.timestamp_column, "Device Timestamp");
        assert_eq!(mapping.value_column, "Historic Glucose mg/dL");
    }

    #[test]
    fn test_bucket_percentages_get_set() {
        let mut pct = BucketPercentages::default();
        pct.set(RangeBucket::Target, 75.0);
        pct.set(RangeBucket::High, 20.0);
        pct.set(RangeBucket::Low, 5.0);
        assert_eq!(pct.get(RangeBucket::Target), 75.0);
        assert!((pct.total() - 100.0).abs() < 1e-9);
        let keys: Vec<RangeBucket> = pct.iter().map(|(b, _)| b).collect();
        assert_eq!(keys, RangeBucket::ALL.to_vec());
    }
}
