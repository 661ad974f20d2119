//! Glucose aggregation: range summary, daily profiles and the AGP curve.
//!
//! Every function is a pure pass over a [`Series`]; nothing is cached and an
//! empty series is always rejected with [`AgpError::EmptySeries`].

use std::collections::BTreeMap;

use agp_core::error::{AgpError, Result};
use agp_core::models::{AgpCurve, AgpPoint, BucketPercentages, DailyProfile, Series, SummaryResult};
use agp_core::ranges::RangeBucket;
use agp_core::stats::{coefficient_of_variation, percentile, sample_std_dev, sort_values};
use agp_core::time_utils::{minute_of_day, minutes_to_hours, MINUTES_PER_DAY};
use chrono::NaiveDate;
use tracing::debug;

// ── TimeOfDayGrouping ─────────────────────────────────────────────────────────

/// How readings are grouped along the time-of-day axis of the AGP curve.
///
/// The default groups readings sharing the exact same `hour + minute / 60`
/// coordinate. A wider interval floors each reading's minute of day to the
/// start of its bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDayGrouping {
    bin_minutes: u32,
}

impl Default for TimeOfDayGrouping {
    fn default() -> Self {
        Self::exact()
    }
}

impl TimeOfDayGrouping {
    /// Group by exact minute of day.
    pub fn exact() -> Self {
        Self { bin_minutes: 1 }
    }

    /// Group into fixed bins of `minutes` (1 ..= 1440).
    pub fn interval(minutes: u32) -> Result<Self> {
        if minutes == 0 || minutes > MINUTES_PER_DAY {
            return Err(AgpError::Config(format!(
                "bin size must be between 1 and {} minutes, got {}",
                MINUTES_PER_DAY, minutes
            )));
        }
        Ok(Self {
            bin_minutes: minutes,
        })
    }

    /// Build from an optional bin size, `None` meaning exact grouping.
    pub fn from_bin_minutes(minutes: Option<u32>) -> Result<Self> {
        minutes.map_or_else(|| Ok(Self::exact()), Self::interval)
    }

    pub fn bin_minutes(&self) -> u32 {
        self.bin_minutes
    }

    /// Start of the bin containing `minute`.
    fn bin_start(&self, minute: u32) -> u32 {
        minute / self.bin_minutes * self.bin_minutes
    }
}

// ── Daily accumulator ─────────────────────────────────────────────────────────

/// Running min / max / sum for one calendar date.
#[derive(Debug, Clone)]
struct DailyStats {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl DailyStats {
    fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    fn add(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    fn into_profile(self, date: NaiveDate) -> DailyProfile {
        DailyProfile {
            date,
            min: self.min,
            max: self.max,
            mean: self.sum / self.count as f64,
            count: self.count,
        }
    }
}

// ── AgpAggregator ─────────────────────────────────────────────────────────────

/// Stateless helper computing the three AGP summaries.
pub struct AgpAggregator;

impl AgpAggregator {
    /// Time-in-range percentages, mean and coefficient of variation.
    pub fn summarize(series: &Series) -> Result<SummaryResult> {
        ensure_not_empty(series)?;

        let values: Vec<f64> = series.values().collect();
        let total = values.len();

        let mut counts = [0usize; RangeBucket::ALL.len()];
        for &value in &values {
            for (slot, bucket) in counts.iter_mut().zip(RangeBucket::ALL) {
                if bucket.contains(value) {
                    *slot += 1;
                }
            }
        }

        let mut ranges = BucketPercentages::default();
        for (count, bucket) in counts.iter().zip(RangeBucket::ALL) {
            ranges.set(bucket, *count as f64 / total as f64 * 100.0);
        }

        let mean = values.iter().sum::<f64>() / total as f64;
        let summary = SummaryResult {
            total_readings: total,
            ranges,
            mean,
            std_dev: sample_std_dev(&values),
            cv_percent: coefficient_of_variation(&values),
        };

        debug!(
            "Summary: {} readings, mean {:.1}, target {:.1}%",
            total, summary.mean, summary.ranges.target
        );
        Ok(summary)
    }

    /// One profile per calendar date present, ascending by date.
    pub fn daily_profiles(series: &Series) -> Result<Vec<DailyProfile>> {
        ensure_not_empty(series)?;

        let mut days: BTreeMap<NaiveDate, DailyStats> = BTreeMap::new();
        for reading in series.readings() {
            let date = reading.timestamp.date();
            let value = reading.glucose_mg_dl;
            days.entry(date)
                .and_modify(|stats| stats.add(value))
                .or_insert_with(|| DailyStats::new(value));
        }

        Ok(days
            .into_iter()
            .map(|(date, stats)| stats.into_profile(date))
            .collect())
    }

    /// Percentile bands per time-of-day group, ascending by time of day.
    pub fn agp_curve(series: &Series, grouping: TimeOfDayGrouping) -> Result<AgpCurve> {
        ensure_not_empty(series)?;

        let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for reading in series.readings() {
            let key = grouping.bin_start(minute_of_day(&reading.timestamp));
            groups.entry(key).or_default().push(reading.glucose_mg_dl);
        }

        let curve: AgpCurve = groups
            .into_iter()
            .map(|(minute, mut values)| {
                sort_values(&mut values);
                band_point(minute, &values)
            })
            .collect();

        debug!(
            "AGP curve: {} rows from {} readings ({}-minute grouping)",
            curve.len(),
            series.len(),
            grouping.bin_minutes()
        );
        Ok(curve)
    }
}

fn ensure_not_empty(series: &Series) -> Result<()> {
    if series.is_empty() {
        return Err(AgpError::EmptySeries);
    }
    Ok(())
}

/// Build one AGP row from a non-empty, sorted group.
fn band_point(minute: u32, sorted: &[f64]) -> AgpPoint {
    // Groups are never empty, so every percentile exists.
    let p = |q: f64| percentile(sorted, q).unwrap_or(f64::NAN);
    AgpPoint {
        time_of_day: minutes_to_hours(minute),
        p5: p(5.0),
        p25: p(25.0),
        median: p(50.0),
        p75: p(75.0),
        p95: p(95.0),
        count: sorted.len(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
