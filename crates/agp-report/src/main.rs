mod bootstrap;
mod text_report;

use std::path::Path;

use anyhow::{bail, Context, Result};
use agp_core::settings::Settings;
use agp_data::aggregator::TimeOfDayGrouping;
use agp_data::analysis::{AgpReport, AnalysisConfig};
use agp_data::export::export_report;
use agp_data::reader::IngestConfig;
use agp_runtime::payload::ReportPayload;
use agp_runtime::session::{ReportSession, Response, Trigger};
use agp_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    let dashboard = settings.view == "dashboard";

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref(), dashboard)?;

    tracing::info!("AGP report v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Theme: {}", settings.view, settings.theme);

    let config = analysis_config(&settings)?;
    let db_path = settings.resolved_db_path();
    tracing::debug!("record store at {}", db_path.display());
    let mut session = ReportSession::new(config, db_path);

    if let Some(dir) = &settings.export {
        let Some(file) = &settings.file else {
            bail!("--export requires an input FILE");
        };
        let (report, _) = load_report(&mut session, file)?;
        let written = export_report(&report, dir)
            .with_context(|| format!("failed to export into {}", dir.display()))?;
        for path in &written {
            tracing::info!("wrote {}", path.display());
        }
        if !dashboard {
            eprintln!("Exported {} files to {}", written.len(), dir.display());
        }
    }

    match settings.view.as_str() {
        "dashboard" => {
            let app = App::new(&settings.theme, session, settings.file.clone());

            // The TUI exits on 'q' / Ctrl+C itself; the OS-level handler
            // covers signals that arrive outside raw mode.
            tokio::select! {
                result = app.run() => {
                    result.context("terminal UI failed")?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        view @ ("summary" | "json") => {
            let Some(file) = &settings.file else {
                bail!("--view {view} requires an input FILE");
            };
            let (_, payload) = load_report(&mut session, file)?;
            if view == "json" {
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print!("{}", text_report::render_summary(&payload));
            }
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// Translate CLI settings into the analysis pipeline's configuration.
fn analysis_config(settings: &Settings) -> Result<AnalysisConfig> {
    let delimiter = u8::try_from(settings.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter must be a single ASCII character, got '{}'", settings.delimiter))?;

    Ok(AnalysisConfig {
        ingest: IngestConfig {
            columns: settings.column_mapping(),
            sheet: settings.sheet.clone(),
            skip_rows: settings.skip_rows,
            delimiter,
        },
        grouping: TimeOfDayGrouping::from_bin_minutes(settings.bin_minutes)?,
    })
}

/// Run one load pass through the session.
fn load_report(session: &mut ReportSession, file: &Path) -> Result<(AgpReport, ReportPayload)> {
    let response = session
        .handle(Trigger::Load(file.to_path_buf()))
        .with_context(|| format!("failed to analyse {}", file.display()))?;
    match response {
        Response::Report { report, payload } => Ok((*report, *payload)),
        other => bail!("unexpected session response: {other:?}"),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
