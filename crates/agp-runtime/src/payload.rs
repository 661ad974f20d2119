//! Presentation adapter between [`AgpReport`] and the views.
//!
//! Everything the dashboard and the JSON output need is precomputed here as
//! plain strings and point lists, so renderers never touch the aggregation
//! types directly.

use agp_core::formatting::{format_count, format_number, format_optional_percent};
use agp_core::ranges::{RangeBucket, TARGET_HIGH_MG_DL, TARGET_LOW_MG_DL};
use agp_data::analysis::{AgpReport, ReportMetadata};
use serde::{Deserialize, Serialize};

/// Left and right edges of the AGP time axis, in hours.
pub const DAY_START_HOURS: f64 = 0.0;
pub const DAY_END_HOURS: f64 = 24.0;

// ── Payload types ─────────────────────────────────────────────────────────────

/// A headline number on the summary screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryCard {
    pub title: String,
    pub value: String,
}

/// One slice of the stacked time-in-range bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSegment {
    pub bucket: RangeBucket,
    pub label: String,
    pub percent: f64,
}

/// Which line of the AGP chart a [`ChartSeries`] draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    P5,
    P25,
    Median,
    P75,
    P95,
    TargetLow,
    TargetHigh,
}

impl SeriesKind {
    pub fn name(&self) -> &'static str {
        match self {
            SeriesKind::P5 => "5th percentile",
            SeriesKind::P25 => "25th percentile",
            SeriesKind::Median => "Median",
            SeriesKind::P75 => "75th percentile",
            SeriesKind::P95 => "95th percentile",
            SeriesKind::TargetLow => "Target low (70)",
            SeriesKind::TargetHigh => "Target high (180)",
        }
    }

    pub fn is_target(&self) -> bool {
        matches!(self, SeriesKind::TargetLow | SeriesKind::TargetHigh)
    }
}

/// `(time_of_day, mg/dL)` points for one chart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: SeriesKind,
    pub points: Vec<(f64, f64)>,
}

/// One row of the daily profile table, preformatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRow {
    pub date: String,
    pub min: String,
    pub max: String,
    pub mean: String,
    pub count: usize,
}

/// View-ready rendition of an [`AgpReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub cards: Vec<SummaryCard>,
    pub segments: Vec<RangeSegment>,
    pub chart: Vec<ChartSeries>,
    pub daily: Vec<DailyRow>,
    pub metadata: ReportMetadata,
}

// ── Construction ──────────────────────────────────────────────────────────────

impl ReportPayload {
    pub fn from_report(report: &AgpReport) -> Self {
        Self {
            cards: summary_cards(report),
            segments: range_segments(report),
            chart: chart_series(report),
            daily: daily_rows(report),
            metadata: report.metadata.clone(),
        }
    }

    /// Highest y value across every chart line, for axis scaling.
    pub fn chart_max(&self) -> f64 {
        self.chart
            .iter()
            .flat_map(|s| s.points.iter().map(|&(_, y)| y))
            .fold(TARGET_HIGH_MG_DL, f64::max)
    }

    /// Look up a chart line by kind.
    pub fn series(&self, kind: SeriesKind) -> Option<&ChartSeries> {
        self.chart.iter().find(|s| s.kind == kind)
    }
}

fn summary_cards(report: &AgpReport) -> Vec<SummaryCard> {
    let card = |title: &str, value: String| SummaryCard {
        title: title.to_string(),
        value,
    };

    vec![
        card(
            "Mean Glucose",
            format!("{} mg/dL", format_number(report.summary.mean, 1)),
        ),
        card("GMI", format!("{}%", format_number(report.gmi, 1))),
        card("CV", format_optional_percent(report.summary.cv_percent)),
        card("Readings", format_count(report.summary.total_readings)),
        card("Date Span", date_span(&report.metadata)),
    ]
}

fn date_span(metadata: &ReportMetadata) -> String {
    match (metadata.first_timestamp, metadata.last_timestamp) {
        (Some(first), Some(last)) => {
            let days = metadata.days_covered;
            format!(
                "{} to {} ({} {})",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d"),
                days,
                if days == 1 { "day" } else { "days" }
            )
        }
        _ => "n/a".to_string(),
    }
}

fn range_segments(report: &AgpReport) -> Vec<RangeSegment> {
    RangeBucket::ALL
        .iter()
        .map(|&bucket| RangeSegment {
            bucket,
            label: bucket.label().to_string(),
            percent: report.summary.ranges.get(bucket),
        })
        .collect()
}

fn chart_series(report: &AgpReport) -> Vec<ChartSeries> {
    let band = |kind: SeriesKind, pick: fn(&agp_core::models::AgpPoint) -> f64| ChartSeries {
        kind,
        points: report
            .agp_curve
            .iter()
            .map(|row| (row.time_of_day, pick(row)))
            .collect(),
    };
    let flat = |kind: SeriesKind, y: f64| ChartSeries {
        kind,
        points: vec![(DAY_START_HOURS, y), (DAY_END_HOURS, y)],
    };

    vec![
        band(SeriesKind::P5, |r| r.p5),
        band(SeriesKind::P25, |r| r.p25),
        band(SeriesKind::Median, |r| r.median),
        band(SeriesKind::P75, |r| r.p75),
        band(SeriesKind::P95, |r| r.p95),
        flat(SeriesKind::TargetLow, TARGET_LOW_MG_DL),
        flat(SeriesKind::TargetHigh, TARGET_HIGH_MG_DL),
    ]
}

fn daily_rows(report: &AgpReport) -> Vec<DailyRow> {
    report
        .daily_profiles
        .iter()
        .map(|p| DailyRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            min: format_number(p.min, 1),
            max: format_number(p.max, 1),
            mean: format_number(p.mean, 1),
            count: p.count,
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
