// Excel import/export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};
use tracing::{debug, info};

use portavoz_resolve::{CellValue, Table};

/// Import the first sheet of an Excel file (xlsx, xls, xlsb, ods).
///
/// The first non-blank row is the header. A leading row or column holding
/// only blanks is dropped, which is how exported reports usually arrive.
pub fn import(path: &Path) -> Result<Table, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let first = sheet_names
        .first()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(first)
        .map_err(|e| format!("Failed to read sheet '{}': {}", first, e))?;

    let mut grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    if grid.first().is_some_and(|row| row.iter().all(CellValue::is_empty)) {
        grid.remove(0);
        info!(sheet = %first, "leading blank row dropped");
    }
    if !grid.is_empty() && grid.iter().all(|row| row.first().map_or(true, CellValue::is_empty)) {
        for row in &mut grid {
            if !row.is_empty() {
                row.remove(0);
            }
        }
        info!(sheet = %first, "leading blank column dropped");
    }

    let mut rows = grid.into_iter();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.display().trim().to_string()).collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(headers);
    for row in rows {
        table.push_row(row);
    }

    debug!(sheet = %first, rows = table.row_count(), "sheet imported");
    Ok(table)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        // Serial number; dates never carry names
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::text(s.as_str()),
        Data::DurationIso(s) => CellValue::text(s.as_str()),
    }
}

/// Export a table as a single-sheet xlsx workbook with a bold header row.
pub fn export(table: &Table, path: &Path) -> Result<(), String> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    for (col, header) in table.headers().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", header, e))?;
    }

    for (row_idx, row) in table.rows().iter().enumerate() {
        let row32 = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row32, col as u16, cell)
                .map_err(|e| format!("Failed to write cell ({}, {}): {}", row32, col, e))?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Error(e) => {
            worksheet.write_string(row, col, e)?;
        }
    }
    Ok(())
}
