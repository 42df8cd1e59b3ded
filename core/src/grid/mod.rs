//! Tabular input.
//!
//! The pipeline only reads cells through the [`Grid`] trait, so any
//! spreadsheet backend can be plugged in. [`Worksheet`] is the in-memory
//! implementation; [`csv`] loads one from a CSV file.

pub mod csv;

use serde::Serialize;

use crate::models::Value;

/// Read-only access to a rectangular-ish sheet. Indices are 0-based.
pub trait Grid {
    /// Number of rows.
    fn max_row(&self) -> usize;

    /// Width of the widest row.
    fn max_column(&self) -> usize;

    /// Raw cell, `None` when outside the sheet or past the row's end.
    fn cell(&self, row: usize, column: usize) -> Option<&Value>;
}

/// In-memory sheet. Rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Worksheet {
    rows: Vec<Vec<Value>>,
}

impl Worksheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows<R, V>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut sheet = Self::new();
        for row in rows {
            sheet.append(row);
        }
        sheet
    }

    /// Add a row at the bottom.
    pub fn append<V: Into<Value>>(&mut self, row: impl IntoIterator<Item = V>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Write one cell, growing the sheet with nulls as needed.
    pub fn set(&mut self, row: usize, column: usize, value: impl Into<Value>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= column {
            cells.resize(column + 1, Value::Null);
        }
        cells[column] = value.into();
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }
}

impl Grid for Worksheet {
    fn max_row(&self) -> usize {
        self.rows.len()
    }

    fn max_column(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row)?.get(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read() {
        let mut sheet = Worksheet::new();
        sheet.append(["Shop", "Qty"]);
        sheet.append([Value::from("A"), Value::Int(3)]);

        assert_eq!(sheet.max_row(), 2);
        assert_eq!(sheet.max_column(), 2);
        assert_eq!(sheet.cell(1, 1), Some(&Value::Int(3)));
        assert_eq!(sheet.cell(1, 2), None);
        assert_eq!(sheet.cell(5, 0), None);
    }

    #[test]
    fn test_set_grows_sheet() {
        let mut sheet = Worksheet::new();
        sheet.set(2, 3, "x");

        assert_eq!(sheet.max_row(), 3);
        assert_eq!(sheet.max_column(), 4);
        assert_eq!(sheet.cell(2, 0), Some(&Value::Null));
        assert_eq!(sheet.cell(0, 0), None);
        assert_eq!(sheet.cell(2, 3), Some(&Value::from("x")));
    }

    #[test]
    fn test_ragged_rows() {
        let sheet = Worksheet::from_rows(vec![vec!["a", "b", "c"], vec!["d"]]);
        assert_eq!(sheet.max_column(), 3);
        assert_eq!(sheet.cell(1, 2), None);
    }
}
