//! CSV export of the daily profile table and the AGP curve.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use agp_core::error::{AgpError, Result};
use agp_core::models::{AgpPoint, DailyProfile};
use agp_core::time_utils::format_time_of_day;
use tracing::info;

use crate::analysis::AgpReport;

pub const DAILY_PROFILES_FILE: &str = "daily_profiles.csv";
pub const AGP_CURVE_FILE: &str = "agp_curve.csv";

fn csv_err(err: csv::Error) -> AgpError {
    AgpError::Csv(err.to_string())
}

/// Write one row per day: `date,min,max,mean,count`.
pub fn write_daily_profiles<W: Write>(profiles: &[DailyProfile], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["date", "min", "max", "mean", "count"])
        .map_err(csv_err)?;
    for p in profiles {
        writer
            .write_record([
                p.date.format("%Y-%m-%d").to_string(),
                format!("{:.1}", p.min),
                format!("{:.1}", p.max),
                format!("{:.1}", p.mean),
                p.count.to_string(),
            ])
            .map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one row per time-of-day group with all five percentile bands.
pub fn write_agp_curve<W: Write>(curve: &[AgpPoint], out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([
            "time_of_day",
            "clock",
            "p5",
            "p25",
            "median",
            "p75",
            "p95",
            "count",
        ])
        .map_err(csv_err)?;
    for row in curve {
        writer
            .write_record([
                format!("{:.4}", row.time_of_day),
                format_time_of_day(row.time_of_day),
                format!("{:.2}", row.p5),
                format!("{:.2}", row.p25),
                format!("{:.2}", row.median),
                format!("{:.2}", row.p75),
                format!("{:.2}", row.p95),
                row.count.to_string(),
            ])
            .map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write both tables into `dir`, creating it if needed.
///
/// Returns the paths written, daily profiles first.
pub fn export_report(report: &AgpReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let daily_path = dir.join(DAILY_PROFILES_FILE);
    let file = File::create(&daily_path)?;
    write_daily_profiles(&report.daily_profiles, file)?;

    let curve_path = dir.join(AGP_CURVE_FILE);
    let file = File::create(&curve_path)?;
    write_agp_curve(&report.agp_curve, file)?;

    info!("Exported report tables to {}", dir.display());
    Ok(vec![daily_path, curve_path])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
