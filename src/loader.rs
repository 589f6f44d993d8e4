use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};

use crate::dataset::{CellValue, Dataset, Row};
use crate::error::AnalyticsError;

/// Parse uploaded Excel bytes into a [`Dataset`].
///
/// Uploads are parsed straight from the request buffer; calamine sniffs
/// the container format, so both `.xlsx` and legacy `.xls` work. The
/// first row of the first worksheet is the header row and defines the
/// column set; every following row becomes a data row. Empty cells are
/// omitted from their row, the same way the client-side sheet parser
/// drops them.
///
/// # Arguments
/// * `bytes` - The raw upload body
///
/// # Returns
/// * `Result<Dataset, AnalyticsError>` - The parsed rows or an error
///
/// # Errors
/// * `AnalyticsError::Sheet` if the bytes are not a readable workbook
///   or the workbook has no sheets
/// * `AnalyticsError::EmptyDataset` if there are no data rows under
///   the header
pub fn dataset_from_excel_bytes(bytes: &[u8]) -> Result<Dataset, AnalyticsError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| AnalyticsError::Sheet(format!("unreadable workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalyticsError::Sheet("workbook has no sheets".to_string()))?
        .map_err(|e| AnalyticsError::Sheet(format!("failed to read sheet: {}", e)))?;

    let mut sheet_rows = range.rows();

    let header = sheet_rows
        .next()
        .ok_or(AnalyticsError::EmptyDataset)?
        .iter()
        .map(header_name)
        .collect::<Vec<_>>();

    let mut rows: Vec<Row> = Vec::new();
    for sheet_row in sheet_rows {
        let mut row = Row::new();
        for (name, cell) in header.iter().zip(sheet_row.iter()) {
            // Unnamed columns are dropped, empty cells stay absent.
            let Some(name) = name else { continue };
            if let Some(value) = convert_cell(cell) {
                row.insert(name.clone(), value);
            }
        }
        // Fully blank sheet rows carry no information.
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Dataset::new(rows)
}

fn header_name(cell: &Data) -> Option<String> {
    let name = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => convert_cell(other).map(|v| v.to_label()).unwrap_or_default(),
    };
    if name.is_empty() { None } else { Some(name) }
}

fn convert_cell(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty => None,
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::String(s) => Some(CellValue::Text(s.clone())),
        // Dates keep their Excel serial value; formatting is a client
        // concern.
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) => None,
    }
}

/// True when `filename` carries an accepted spreadsheet extension.
pub fn is_excel_filename(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}
