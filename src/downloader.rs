use rust_xlsxwriter::{Workbook, Worksheet};

use crate::dataset::{CellValue, Dataset};
use crate::error::AnalyticsError;

/// Convert a dataset back to XLSX format
///
/// Re-serializes the parsed rows to a fresh workbook using the
/// rust_xlsxwriter library: a header row with the column names, then
/// one sheet row per data row. Cells a row never had stay blank.
///
/// # Arguments
/// * `dataset` - The rows to export
///
/// # Returns
/// * `Result<Vec<u8>, AnalyticsError>` - XLSX file content as bytes or an error
pub fn to_xlsx(dataset: &Dataset) -> Result<Vec<u8>, AnalyticsError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    let columns = dataset.columns();

    for (c, name) in columns.iter().enumerate() {
        worksheet
            .write_string(0, c as u16, name)
            .map_err(|e| AnalyticsError::Sheet(e.to_string()))?;
    }

    for (r, row) in dataset.rows.iter().enumerate() {
        for (c, name) in columns.iter().enumerate() {
            let Some(value) = row.get(name) else { continue };
            let sheet_row = (r + 1) as u32;
            let sheet_col = c as u16;

            match value {
                CellValue::Number(n) => worksheet.write_number(sheet_row, sheet_col, *n),
                CellValue::Bool(b) => worksheet.write_boolean(sheet_row, sheet_col, *b),
                CellValue::Text(s) => worksheet.write_string(sheet_row, sheet_col, s),
            }
            .map_err(|e| AnalyticsError::Sheet(e.to_string()))?;
        }
    }

    workbook.push_worksheet(worksheet);

    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| AnalyticsError::Sheet(e.to_string()))?;

    Ok(buffer)
}
