//! Spreadsheet and CSV ingestion for the AGP report.
//!
//! Reads a device export (workbook or delimited text), locates the
//! configured timestamp and glucose columns in the header row, and converts
//! every data row into a [`Reading`]. Any unparseable timestamp or glucose
//! value fails the whole dataset.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use agp_core::error::{AgpError, Result};
use agp_core::models::{ColumnMapping, Reading, Series};
use agp_core::time_utils::parse_timestamp;
use calamine::{Data, DataType, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ── IngestConfig ──────────────────────────────────────────────────────────────

/// How to locate readings inside a source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Header names of the timestamp and glucose columns.
    pub columns: ColumnMapping,
    /// Worksheet to read; the first sheet when `None`. Ignored for CSV.
    pub sheet: Option<String>,
    /// Leading rows to skip before the header row.
    pub skip_rows: usize,
    /// Field delimiter for CSV input.
    pub delimiter: u8,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            sheet: None,
            skip_rows: 0,
            delimiter: b',',
        }
    }
}

// ── SourceFormat ──────────────────────────────────────────────────────────────

/// Container format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Office Open XML / legacy Excel / OpenDocument workbook.
    Workbook,
    /// Comma- (or otherwise) separated text.
    Delimited,
}

impl SourceFormat {
    /// Infer the format from a file extension, `None` when unrecognised.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Workbook),
            "csv" | "tsv" | "txt" => Some(SourceFormat::Delimited),
            _ => None,
        }
    }

    /// Infer the format from leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(CFB_MAGIC) {
            SourceFormat::Workbook
        } else {
            SourceFormat::Delimited
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read a [`Series`] from a file on disk.
pub fn read_series(path: &Path, config: &IngestConfig) -> Result<Series> {
    let format = SourceFormat::from_path(path);
    let series = match format {
        Some(SourceFormat::Workbook) => {
            std::fs::metadata(path).map_err(|source| AgpError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
            let mut workbook = calamine::open_workbook_auto(path)
                .map_err(|e| AgpError::Workbook(e.to_string()))?;
            let table = workbook_table(&mut workbook, config.sheet.as_deref())?;
            table_to_series(&table, config)?
        }
        _ => {
            let bytes = std::fs::read(path).map_err(|source| AgpError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
            read_series_from_bytes(&bytes, config)?
        }
    };

    info!("Loaded {} readings from {}", series.len(), path.display());
    Ok(series)
}

/// Read a [`Series`] from an in-memory upload, sniffing the format.
pub fn read_series_from_bytes(bytes: &[u8], config: &IngestConfig) -> Result<Series> {
    let table = match SourceFormat::sniff(bytes) {
        SourceFormat::Workbook => {
            // ZIP covers xlsx, xlsb and ods; CFB is legacy xls.
            let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
                .map_err(|e| AgpError::Workbook(e.to_string()))?;
            workbook_table(&mut workbook, config.sheet.as_deref())?
        }
        SourceFormat::Delimited => delimited_table(bytes, config.delimiter)?,
    };
    table_to_series(&table, config)
}

// ── Raw table model ───────────────────────────────────────────────────────────

/// A source cell, normalised across workbook and CSV inputs.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    fn header_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::DateTime(dt) => dt.to_string(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Cell::Empty => "<empty>".to_string(),
            other => format!("'{}'", other.header_text()),
        }
    }
}

/// Rows of a sheet or CSV file. `first_row` is the 0-based index of
/// `rows[0]` in the source, used for error messages and `skip_rows`.
#[derive(Debug, Default)]
struct RawTable {
    first_row: usize,
    rows: Vec<Vec<Cell>>,
}

fn workbook_table<RS, R>(workbook: &mut R, sheet: Option<&str>) -> Result<RawTable>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                AgpError::Schema(format!(
                    "sheet '{}' not found (available: {})",
                    wanted,
                    names.join(", ")
                ))
            })?,
        None => names
            .first()
            .cloned()
            .ok_or_else(|| AgpError::Schema("workbook contains no sheets".to_string()))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| AgpError::Workbook(format!("sheet '{}': {}", name, e)))?;

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    debug!("Sheet '{}': {} rows starting at row {}", name, range.height(), first_row + 1);
    Ok(RawTable { first_row, rows })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => data
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(data.to_string())),
        other => Cell::Text(other.to_string()),
    }
}

fn delimited_table(bytes: &[u8], delimiter: u8) -> Result<RawTable> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AgpError::Csv(e.to_string()))?;
        rows.push(record.iter().map(|f| Cell::Text(f.to_string())).collect());
    }
    Ok(RawTable { first_row: 0, rows })
}

// ── Row conversion ────────────────────────────────────────────────────────────

fn table_to_series(table: &RawTable, config: &IngestConfig) -> Result<Series> {
    let header_idx = config.skip_rows.saturating_sub(table.first_row);
    let header = table
        .rows
        .get(header_idx)
        .ok_or_else(|| AgpError::Schema("table has no header row".to_string()))?;

    let headers: Vec<String> = header.iter().map(Cell::header_text).collect();
    let find = |name: &str| headers.iter().position(|h| h == name.trim());
    let ts_col = find(&config.columns.timestamp_column);
    let value_col = find(&config.columns.value_column);

    let (ts_col, value_col) = match (ts_col, value_col) {
        (Some(t), Some(v)) => (t, v),
        (t, v) => {
            let missing: Vec<&str> = [
                (t, config.columns.timestamp_column.as_str()),
                (v, config.columns.value_column.as_str()),
            ]
            .iter()
            .filter(|(idx, _)| idx.is_none())
            .map(|(_, name)| *name)
            .collect();
            return Err(AgpError::Schema(format!(
                "missing required column(s): {}",
                missing
                    .iter()
                    .map(|m| format!("'{m}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
    };

    let empty = Cell::Empty;
    let mut readings = Vec::new();
    let mut skipped = 0usize;

    for (offset, row) in table.rows.iter().enumerate().skip(header_idx + 1) {
        let row_number = table.first_row + offset + 1;
        let ts_cell = row.get(ts_col).unwrap_or(&empty);
        let value_cell = row.get(value_col).unwrap_or(&empty);

        if value_cell.is_empty() {
            if !ts_cell.is_empty() {
                parse_timestamp_cell(ts_cell, row_number)?;
                skipped += 1;
            }
            continue;
        }

        let glucose = parse_glucose_cell(value_cell, row_number)?;
        let timestamp = parse_timestamp_cell(ts_cell, row_number)?;
        readings.push(Reading::new(timestamp, glucose));
    }

    debug!(
        "Converted {} readings, skipped {} rows without a glucose value",
        readings.len(),
        skipped
    );

    Ok(Series::new(readings))
}

fn parse_timestamp_cell(cell: &Cell, row: usize) -> Result<NaiveDateTime> {
    let parsed = match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Number(serial) => excel_serial_to_datetime(*serial),
        Cell::Text(s) => parse_timestamp(s),
        Cell::Empty => return Err(AgpError::parse(row, "missing timestamp")),
    };
    parsed.ok_or_else(|| AgpError::parse(row, format!("invalid timestamp {}", cell.describe())))
}

fn parse_glucose_cell(cell: &Cell, row: usize) -> Result<f64> {
    let parsed = match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| AgpError::parse(row, format!("invalid glucose value {}", cell.describe())))
}

/// Convert an Excel serial date (days since 1899-12-30) to a wall-clock time,
/// rounded to the millisecond.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(chrono::Duration::milliseconds(millis))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
