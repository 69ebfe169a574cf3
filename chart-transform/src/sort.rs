//! FILENAME: chart-transform/src/sort.rs
//! Column-wise sort over mixed-type cells.
//!
//! Chart columns mix numbers, numeric strings, plain strings and nulls.
//! Values that coerce to numbers order numerically; everything else sorts
//! after them and compares equal among itself, so the stable sort keeps
//! non-numeric values in input order.

use std::cmp::Ordering;
use chart_table::{CellValue, Table};
use crate::error::TransformError;

/// Reorders the data rows (header fixed) by the value at `sort_col`.
///
/// The sort is stable: rows with equal keys keep their relative input
/// order, which also makes the sort idempotent. An out-of-range column is
/// a structurally malformed call and fails like any other bad index.
pub fn sort_table_by_column(
    table: &Table,
    sort_col: usize,
    ascending: bool,
) -> Result<Table, TransformError> {
    let column_count = table.column_count();
    if sort_col >= column_count {
        return Err(TransformError::ColumnOutOfRange {
            col: sort_col as i64,
            column_count,
        });
    }

    let mut data: Vec<Vec<CellValue>> = table.data_rows().to_vec();
    data.sort_by(|a, b| {
        let ordering = compare_cells_for_sort(a.get(sort_col), b.get(sort_col));
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });

    let mut rows = Vec::with_capacity(data.len() + 1);
    rows.push(table.header().to_vec());
    rows.extend(data);
    Ok(Table::from_rows(rows))
}

/// Comparison function for sort keys.
/// Coercible values compare numerically and precede all non-coercible ones;
/// non-coercible values (nulls, plain strings) are mutually equal.
fn compare_cells_for_sort(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    let na = a.and_then(CellValue::as_aggregable);
    let nb = b.and_then(CellValue::as_aggregable);

    match (na, nb) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
