// CSV/TSV import/export

use std::cmp::Reverse;
use std::io::Read;
use std::path::Path;

use portavoz_resolve::{CellValue, Table};

pub fn import(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
}

/// Candidate delimiters in tie-break order.
const DELIMITERS: [u8; 4] = [b';', b'\t', b',', b'|'];
const SAMPLE_RECORDS: usize = 10;

/// Pick the field delimiter from the first records of `content`.
///
/// Each candidate parses the sample as CSV, so quoted fields (embedded
/// newlines included) are seen the way the import will see them. A candidate
/// needs at least two header fields. Highest count of records matching the
/// header width wins; then the wider header; then the earlier candidate.
pub(crate) fn sniff_delimiter(content: &str) -> u8 {
    DELIMITERS
        .iter()
        .enumerate()
        .filter_map(|(rank, &delimiter)| {
            let widths = record_widths(content, delimiter);
            let header = *widths.first()?;
            if header < 2 {
                return None;
            }
            let consistent = widths.iter().filter(|&&w| w == header).count();
            Some(((consistent, header, Reverse(rank)), delimiter))
        })
        .max_by_key(|(score, _)| *score)
        .map_or(b',', |(_, delimiter)| delimiter)
}

/// Field counts of the leading records; stops at the first parse error.
fn record_widths(content: &str, delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .take(SAMPLE_RECORDS)
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect()
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            tracing::debug!(path = %path.display(), "decoded as windows-1252");
            decoded.into_owned()
        }
    };
    Ok(text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text))
}

/// First record is the header row. Fields are loaded as text.
fn import_from_string(content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(header) => header
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(headers);
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        table.push_row(record.iter().map(CellValue::text).collect());
    }

    Ok(table)
}

pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    export_with_delimiter(table, path, b',')
}

fn export_with_delimiter(table: &Table, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    writer.write_record(table.headers()).map_err(|e| e.to_string())?;
    for row in table.rows() {
        let record: Vec<String> = row.iter().map(CellValue::display).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}
