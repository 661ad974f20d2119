use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agp_core::settings::{app_dir, app_dir_in};

/// File name of the default log inside `~/.agp-report/logs/`.
pub const LOG_FILE_NAME: &str = "agp-report.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.agp-report/` and `~/.agp-report/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    ensure_directories_in(&home)
}

/// Create the directory hierarchy under `base_dir` (used for testing).
pub fn ensure_directories_in(base_dir: &Path) -> anyhow::Result<()> {
    let root = app_dir_in(base_dir);
    std::fs::create_dir_all(root.join("logs"))
        .with_context(|| format!("failed to create {}", root.display()))?;
    Ok(())
}

/// `~/.agp-report/logs/agp-report.log`.
pub fn default_log_file() -> PathBuf {
    app_dir().join("logs").join(LOG_FILE_NAME)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map Python-style level names onto tracing filter directives.
///
/// Unknown names pass through lowercased so `EnvFilter` can still accept
/// things like `agp_data=trace`.
pub fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to `log_file` when given. Otherwise `to_file` selects between
/// [`default_log_file`] (the dashboard owns the terminal) and stderr.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>, to_file: bool) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let target = match log_file {
        Some(path) => Some(path.clone()),
        None if to_file => Some(default_log_file()),
        None => None,
    };

    let file_layer = match target {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer.is_none().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("failed to initialise logging")?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
