//! Request/response report session.
//!
//! A [`ReportSession`] holds at most one loaded [`Series`] plus the editable
//! records. Every [`Trigger`] runs one complete pass and returns a
//! [`Response`]; nothing is cached between passes except the series itself.

use std::path::{Path, PathBuf};

use agp_core::error::{AgpError, Result};
use agp_core::models::Series;
use agp_data::analysis::{analyze_file, analyze_series, AgpReport, AnalysisConfig};
use agp_data::store::{seed_records, Record, RecordStore};

use crate::payload::ReportPayload;

// ── Public types ──────────────────────────────────────────────────────────────

/// An external request for one pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// Ingest a file and replace the current series.
    Load(PathBuf),
    /// Recompute the report from the current series.
    Recompute,
    /// Replace every row in the record store.
    SaveRecords(Vec<Record>),
    /// Read every row from the record store.
    LoadRecords,
}

/// The outcome of a successful pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Report {
        report: Box<AgpReport>,
        payload: Box<ReportPayload>,
    },
    RecordsSaved(usize),
    Records(Vec<Record>),
}

// ── ReportSession ─────────────────────────────────────────────────────────────

pub struct ReportSession {
    config: AnalysisConfig,
    series: Option<Series>,
    source: Option<PathBuf>,
    records: Vec<Record>,
    store: Option<RecordStore>,
    store_path: Option<PathBuf>,
}

impl ReportSession {
    /// A session whose record store is opened at `store_path` on first use.
    pub fn new(config: AnalysisConfig, store_path: PathBuf) -> Self {
        Self {
            config,
            series: None,
            source: None,
            records: seed_records(),
            store: None,
            store_path: Some(store_path),
        }
    }

    /// A session backed by an already-open store.
    pub fn with_store(config: AnalysisConfig, store: RecordStore) -> Self {
        Self {
            config,
            series: None,
            source: None,
            records: seed_records(),
            store: Some(store),
            store_path: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn has_data(&self) -> bool {
        self.series.is_some()
    }

    pub fn series(&self) -> Option<&Series> {
        self.series.as_ref()
    }

    /// Path of the file behind the current series.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Records as last saved, loaded or seeded.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Run one pass for `trigger`.
    ///
    /// A failed `Load` leaves the session without a series.
    pub fn handle(&mut self, trigger: Trigger) -> Result<Response> {
        tracing::debug!(?trigger, "handling trigger");
        let result = match trigger {
            Trigger::Load(path) => self.load(path),
            Trigger::Recompute => self.recompute(),
            Trigger::SaveRecords(records) => self.save_records(records),
            Trigger::LoadRecords => self.load_records(),
        };
        if let Err(e) = &result {
            tracing::warn!(error = %e, "pass failed");
        }
        result
    }

    fn load(&mut self, path: PathBuf) -> Result<Response> {
        self.series = None;
        self.source = None;

        let (report, series) = analyze_file(&path, &self.config)?;
        self.series = Some(series);
        self.source = Some(path);
        Ok(report_response(report))
    }

    fn recompute(&mut self) -> Result<Response> {
        let series = self.series.as_ref().ok_or(AgpError::NoData)?;
        let mut report = analyze_series(series, &self.config)?;
        report.metadata.source = self
            .source
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());
        Ok(report_response(report))
    }

    fn save_records(&mut self, records: Vec<Record>) -> Result<Response> {
        let written = self.store()?.replace_all(&records)?;
        self.records = records;
        Ok(Response::RecordsSaved(written))
    }

    fn load_records(&mut self) -> Result<Response> {
        let records = self.store()?.load_all()?;
        self.records = records.clone();
        Ok(Response::Records(records))
    }

    /// Open the store lazily so a bad database path only affects record passes.
    fn store(&mut self) -> Result<&mut RecordStore> {
        if self.store.is_none() {
            let path = self
                .store_path
                .as_deref()
                .ok_or_else(|| AgpError::Store("no record store configured".to_string()))?;
            self.store = Some(RecordStore::open(path)?);
        }
        self.store
            .as_mut()
            .ok_or_else(|| AgpError::Store("record store unavailable".to_string()))
    }
}

fn report_response(report: AgpReport) -> Response {
    let payload = ReportPayload::from_report(&report);
    Response::Report {
        report: Box::new(report),
        payload: Box::new(payload),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
