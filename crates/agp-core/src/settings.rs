use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{ColumnMapping, DEFAULT_TIMESTAMP_COLUMN, DEFAULT_VALUE_COLUMN};

/// Name of the per-user state directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".agp-report";

/// File name of the record store inside [`APP_DIR_NAME`].
pub const DEFAULT_DB_FILE: &str = "data_store.db";

/// Return `~/.agp-report`, falling back to `./.agp-report` without a home dir.
pub fn app_dir() -> PathBuf {
    app_dir_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
}

/// Return the app directory rooted at `base_dir` (used for testing).
pub fn app_dir_in(base_dir: &Path) -> PathBuf {
    base_dir.join(APP_DIR_NAME)
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Ambulatory glucose profile report for CGM exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "agp-report",
    about = "Ambulatory glucose profile report for CGM exports",
    version
)]
pub struct Settings {
    /// Spreadsheet (.xlsx, .xls, .ods) or CSV export with glucose readings
    pub file: Option<PathBuf>,

    /// Output mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "summary", "json"])]
    pub view: String,

    /// Header of the timestamp column
    #[arg(long, default_value = DEFAULT_TIMESTAMP_COLUMN)]
    pub timestamp_column: String,

    /// Header of the glucose (mg/dL) column
    #[arg(long, default_value = DEFAULT_VALUE_COLUMN)]
    pub value_column: String,

    /// Worksheet to read (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Number of leading rows to skip before the header row
    #[arg(long, default_value = "0")]
    pub skip_rows: usize,

    /// Field delimiter for CSV input
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Group the AGP curve into fixed intervals of this many minutes (1-60)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=60))]
    pub bin_minutes: Option<u32>,

    /// Write daily_profiles.csv and agp_curve.csv into this directory
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Location of the editable-table database
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.agp-report/last_used.json`.
///
/// `sheet` and `bin_minutes` describe a single run and are never stored.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        app_dir().join("last_used.json")
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        app_dir_in(base_dir).join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("failed to clear {}: {}", config_path.display(), e);
            }
            return settings.apply_debug();
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins. clap stores arg ids by field name (underscores).
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timestamp_column") {
            if let Some(v) = last.timestamp_column {
                settings.timestamp_column = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "value_column") {
            if let Some(v) = last.value_column {
                settings.value_column = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "skip_rows") {
            if let Some(v) = last.skip_rows {
                settings.skip_rows = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "delimiter") {
            if let Some(v) = last.delimiter {
                settings.delimiter = v;
            }
        }
        if settings.db_path.is_none() {
            settings.db_path = last.db_path;
        }

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!("failed to persist settings: {}", e);
        }

        settings.apply_debug()
    }

    /// The configured column-name mapping.
    pub fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping {
            timestamp_column: self.timestamp_column.clone(),
            value_column: self.value_column.clone(),
        }
    }

    /// The record store path, defaulting to `~/.agp-report/data_store.db`.
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| app_dir().join(DEFAULT_DB_FILE))
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            view: Some(s.view.clone()),
            theme: Some(s.theme.clone()),
            timestamp_column: Some(s.timestamp_column.clone()),
            value_column: Some(s.value_column.clone()),
            skip_rows: Some(s.skip_rows),
            delimiter: Some(s.delimiter),
            db_path: s.db_path.clone(),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
