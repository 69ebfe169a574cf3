//! FILENAME: chart-table/src/table.rs
//! PURPOSE: The tabular container every transform consumes and produces.
//! CONTEXT: A `Table` is an ordered sequence of rows where row 0 is the
//! header (column names). Tables are immutable inputs: transforms build a
//! new `Table` and never mutate the one they were given.

use serde::{Deserialize, Serialize};
use crate::value::CellValue;

/// A chart data table: header row followed by data rows.
///
/// Rows may be ragged at the boundary (a malformed query result); readers
/// treat missing trailing cells as `CellValue::Empty`. The column count is
/// defined by the header row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Creates a table from raw rows. Row 0 is treated as the header.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Table { rows }
    }

    /// True when the table has no rows at all (not even a header).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, header included.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// The header row. Empty slice for an empty table.
    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// The rows after the header.
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        if self.rows.is_empty() {
            &[]
        } else {
            &self.rows[1..]
        }
    }

    /// Number of columns, defined by the header row.
    pub fn column_count(&self) -> usize {
        self.header().len()
    }

    /// Number of rows including the header.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Display name of a column, from the header cell at `col`.
    /// Out-of-range columns name as the empty string.
    pub fn column_name(&self, col: usize) -> String {
        self.header()
            .get(col)
            .map(|cell| cell.display_value())
            .unwrap_or_default()
    }

    /// The cell at (row, col), header row included; `Empty` when the row
    /// is ragged and the cell does not exist.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }
}
