//! Main analysis pipeline for the AGP report.
//!
//! Ingests a device export (or takes an already-built [`Series`]), runs the
//! three aggregations and returns an [`AgpReport`] ready for the UI layer.

use std::path::Path;
use std::time::Instant;

use agp_core::error::Result;
use agp_core::models::{AgpCurve, DailyProfile, Series, SummaryResult};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::{AgpAggregator, TimeOfDayGrouping};
use crate::reader::{read_series, IngestConfig};

// ── Public types ──────────────────────────────────────────────────────────────

/// Ingestion and grouping options for one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub ingest: IngestConfig,
    pub grouping: TimeOfDayGrouping,
}

/// Metadata produced alongside the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// File name the readings came from, `None` for in-memory series.
    pub source: Option<String>,
    /// Number of readings aggregated.
    pub readings: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    /// Number of distinct calendar dates with at least one reading.
    pub days_covered: usize,
    /// Wall-clock seconds spent reading the file, `None` for in-memory series.
    pub load_time_seconds: Option<f64>,
    /// Wall-clock seconds spent aggregating.
    pub compute_time_seconds: f64,
}

/// The complete output of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgpReport {
    pub summary: SummaryResult,
    pub gmi: f64,
    pub daily_profiles: Vec<DailyProfile>,
    pub agp_curve: AgpCurve,
    pub metadata: ReportMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run every aggregation over `series`.
pub fn analyze_series(series: &Series, config: &AnalysisConfig) -> Result<AgpReport> {
    build_report(series, config, None, None)
}

/// Read `path` and run every aggregation over its readings.
///
/// Returns the report together with the ingested series so callers can
/// recompute later without touching the file again.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<(AgpReport, Series)> {
    let load_start = Instant::now();
    let series = read_series(path, &config.ingest)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let report = build_report(&series, config, source, Some(load_time))?;
    Ok((report, series))
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn build_report(
    series: &Series,
    config: &AnalysisConfig,
    source: Option<String>,
    load_time_seconds: Option<f64>,
) -> Result<AgpReport> {
    let compute_start = Instant::now();
    let summary = AgpAggregator::summarize(series)?;
    let daily_profiles = AgpAggregator::daily_profiles(series)?;
    let agp_curve = AgpAggregator::agp_curve(series, config.grouping)?;
    let compute_time = compute_start.elapsed().as_secs_f64();

    let metadata = ReportMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source,
        readings: series.len(),
        first_timestamp: series.first_timestamp(),
        last_timestamp: series.last_timestamp(),
        days_covered: daily_profiles.len(),
        load_time_seconds,
        compute_time_seconds: compute_time,
    };

    info!(
        "Analyzed {} readings over {} days into {} AGP rows",
        metadata.readings,
        metadata.days_covered,
        agp_curve.len()
    );

    Ok(AgpReport {
        gmi: summary.gmi(),
        summary,
        daily_profiles,
        agp_curve,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use agp_core::error::AgpError;
    use agp_core::models::Reading;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Device Timestamp,Historic Glucose mg/dL").unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    // ── analyze_series ────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_series_scenario() {
        let series = Series::new(vec![
            Reading::new(ts("2024-01-01 08:00"), 70.0),
            Reading::new(ts("2024-01-01 08:00"), 180.0),
            Reading::new(ts("2024-01-02 08:00"), 125.0),
        ]);
        let report = analyze_series(&series, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.summary.total_readings, 3);
        assert_eq!(report.daily_profiles.len(), 2);
        assert_eq!(report.agp_curve.len(), 1);
        assert!((report.gmi - (3.31 + 0.02392 * 125.0)).abs() < 1e-9);
        assert_eq!(report.metadata.source, None);
        assert_eq!(report.metadata.load_time_seconds, None);
        assert_eq!(report.metadata.days_covered, 2);
        assert_eq!(report.metadata.first_timestamp, Some(ts("2024-01-01 08:00")));
        assert_eq!(report.metadata.last_timestamp, Some(ts("2024-01-02 08:00")));
    }

    #[test]
    fn test_analyze_series_empty_aborts() {
        let result = analyze_series(&Series::default(), &AnalysisConfig::default());
        assert!(matches!(result, Err(AgpError::EmptySeries)));
    }

    #[test]
    fn test_analyze_series_uses_grouping() {
        let series = Series::new(vec![
            Reading::new(ts("2024-01-01 08:01"), 100.0),
            Reading::new(ts("2024-01-01 08:07"), 110.0),
        ]);
        let exact = analyze_series(&series, &AnalysisConfig::default()).unwrap();
        assert_eq!(exact.agp_curve.len(), 2);

        let config = AnalysisConfig {
            grouping: TimeOfDayGrouping::interval(15).unwrap(),
            ..Default::default()
        };
        let binned = analyze_series(&series, &config).unwrap();
        assert_eq!(binned.agp_curve.len(), 1);
    }

    // ── analyze_file ──────────────────────────────────────────────────────────

    #[test]
    fn test_analyze_file_basic_pipeline() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "export.csv",
            &["2024-01-01 08:00,70", "2024-01-01 08:00,180", "2024-01-02 08:00,125"],
        );

        let (report, series) = analyze_file(&path, &AnalysisConfig::default()).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(report.metadata.source.as_deref(), Some("export.csv"));
        assert!(report.metadata.load_time_seconds.unwrap() >= 0.0);
        assert!(report.metadata.compute_time_seconds >= 0.0);
        assert!(!report.metadata.generated_at.is_empty());
        assert!((report.summary.ranges.target - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_file_header_only_is_empty_series() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "empty.csv", &[]);
        let result = analyze_file(&path, &AnalysisConfig::default());
        assert!(matches!(result, Err(AgpError::EmptySeries)));
    }

    #[test]
    fn test_analyze_file_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = analyze_file(&dir.path().join("nope.csv"), &AnalysisConfig::default());
        assert!(matches!(result, Err(AgpError::FileRead { .. })));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let series = Series::new(vec![Reading::new(ts("2024-01-01 08:00"), 100.0)]);
        let report = analyze_series(&series, &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total_readings"], 1);
        assert!(json["agp_curve"].is_array());
    }
}
