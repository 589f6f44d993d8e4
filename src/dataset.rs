use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// A single spreadsheet cell value.
///
/// Serialized untagged so rows embed as plain JSON objects
/// (`{"Month": "Jan", "Sales": 120.0}`), the same shape the raw sheet
/// rows take on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric cell. Excel stores all numbers as floats.
    Number(f64),

    /// Boolean cell.
    Bool(bool),

    /// Text cell (also the fallback for anything else).
    Text(String),
}

impl CellValue {
    /// Coerce a cell to a chart number.
    ///
    /// Follows loose JavaScript `Number(v) || 0` semantics on purpose:
    /// numbers pass through (NaN becomes 0), booleans map to 1/0, and
    /// text parses as a float or falls back to 0. Lossy, but it is the
    /// behavior chart consumers already rely on.
    pub fn to_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => {
                if n.is_nan() {
                    0.0
                } else {
                    *n
                }
            }
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Text(s) => match s.trim().parse::<f64>() {
                Ok(n) if !n.is_nan() => n,
                _ => 0.0,
            },
        }
    }

    /// Coerce a cell to an axis label.
    ///
    /// Whole numbers print without a trailing `.0` so labels read the
    /// way they did in the sheet.
    pub fn to_label(&self) -> String {
        match self {
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// One parsed sheet row: column name to cell value, in sheet order.
pub type Row = IndexMap<String, CellValue>;

/// Column partition produced by [`Dataset::classify`].
///
/// The two lists are disjoint and together cover the full column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    /// Columns where every row holds a numeric value.
    pub numeric_columns: Vec<String>,

    /// Every other column.
    pub text_columns: Vec<String>,
}

/// A parsed spreadsheet: a non-empty list of rows.
///
/// The column set is defined by the first row's keys, in first-seen
/// order. Later rows may omit keys; a missing key reads as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from parsed rows.
    ///
    /// # Errors
    /// * `AnalyticsError::EmptyDataset` if there are no rows
    pub fn new(rows: Vec<Row>) -> Result<Self, AnalyticsError> {
        if rows.is_empty() {
            return Err(AnalyticsError::EmptyDataset);
        }
        Ok(Dataset { rows })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The column set: keys of the first row, in sheet order.
    pub fn columns(&self) -> Vec<String> {
        match self.rows.first() {
            Some(row) => row.keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// True if `name` is a member of the column set.
    pub fn has_column(&self, name: &str) -> bool {
        match self.rows.first() {
            Some(row) => row.contains_key(name),
            None => false,
        }
    }

    /// Partition the column set into numeric and text columns.
    ///
    /// A column is numeric only when EVERY row holds a value of numeric
    /// type under it. This is a type check, not a parse: the string
    /// `"42"` still marks its column as text, and a row that omits the
    /// key disqualifies the column too.
    pub fn classify(&self) -> ColumnClassification {
        let mut numeric_columns = Vec::new();
        let mut text_columns = Vec::new();

        for column in self.columns() {
            let all_numeric = self
                .rows
                .iter()
                .all(|row| matches!(row.get(&column), Some(CellValue::Number(_))));

            if all_numeric {
                numeric_columns.push(column);
            } else {
                text_columns.push(column);
            }
        }

        ColumnClassification {
            numeric_columns,
            text_columns,
        }
    }

    /// Coerced numeric value at (`row_idx`, `column`); absent cells are 0.
    pub fn number_at(&self, row_idx: usize, column: &str) -> f64 {
        self.rows
            .get(row_idx)
            .and_then(|row| row.get(column))
            .map(CellValue::to_number)
            .unwrap_or(0.0)
    }

    /// Coerced label at (`row_idx`, `column`); absent cells are "".
    pub fn label_at(&self, row_idx: usize, column: &str) -> String {
        self.rows
            .get(row_idx)
            .and_then(|row| row.get(column))
            .map(CellValue::to_label)
            .unwrap_or_default()
    }
}
