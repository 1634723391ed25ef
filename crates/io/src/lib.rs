// File I/O for input, reference and output tables

pub mod csv;
pub mod json;
pub mod report;
pub mod xlsx;

use std::path::{Path, PathBuf};

use tracing::info;

use portavoz_resolve::{ReconciliationRecord, ResolveError, Table};

/// Timestamp format used in generated file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Xlsx,
    Json,
}

impl Format {
    /// Infer from extension (case-insensitive). `.xls`/`.xlsb`/`.ods` read as Excel.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Xlsx),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn format_of(path: &Path) -> Result<Format, ResolveError> {
    Format::from_path(path).ok_or_else(|| {
        ResolveError::Io(format!(
            "{}: unsupported file type (expected .csv, .xlsx or .json)",
            path.display()
        ))
    })
}

/// Load a table in the format implied by the path.
pub fn read_table(path: &Path) -> Result<Table, ResolveError> {
    let table = match format_of(path)? {
        Format::Csv => csv::import(path),
        Format::Xlsx => xlsx::import(path),
        Format::Json => json::import(path),
    }
    .map_err(ResolveError::Io)?;

    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.headers().len(),
        "table loaded"
    );
    Ok(table)
}

/// Write a table in the format implied by the path. Legacy Excel
/// extensions are written as xlsx.
pub fn write_table(table: &Table, path: &Path) -> Result<(), ResolveError> {
    match format_of(path)? {
        Format::Csv => csv::export(table, path),
        Format::Xlsx => xlsx::export(table, path),
        Format::Json => json::export(table, path),
    }
    .map_err(|e| ResolveError::Io(format!("{}: {}", path.display(), e)))?;

    info!(path = %path.display(), rows = table.row_count(), "table written");
    Ok(())
}

/// Write the reconciliation report. Returns `false` (and writes nothing)
/// when there are no records.
pub fn write_report(records: &[ReconciliationRecord], path: &Path) -> Result<bool, ResolveError> {
    if records.is_empty() {
        return Ok(false);
    }
    report::export(records, path)
        .map_err(|e| ResolveError::Io(format!("{}: {}", path.display(), e)))?;

    info!(path = %path.display(), records = records.len(), "report written");
    Ok(true)
}

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Where the output table goes: the input itself when `in_place`,
/// otherwise `<stem>_with_ids_<ts>.<ext>` next to it. Legacy Excel inputs
/// produce an `.xlsx` sibling.
pub fn output_path(input: &Path, in_place: bool, timestamp: &str) -> PathBuf {
    if in_place {
        return input.to_path_buf();
    }
    let ext = match Format::from_path(input) {
        Some(Format::Xlsx) => "xlsx".to_string(),
        _ => extension(input),
    };
    sibling(input, &format!("{}_with_ids_{}.{}", stem(input), timestamp, ext))
}

/// `<stem>_spokesperson_report_<ts>.csv` next to the input.
pub fn report_path(input: &Path, timestamp: &str) -> PathBuf {
    sibling(input, &format!("{}_spokesperson_report_{}.csv", stem(input), timestamp))
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string())
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    match path.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
