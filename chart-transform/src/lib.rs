//! FILENAME: chart-transform/src/lib.rs
//! Chart data transformation subsystem.
//!
//! This crate turns a tabular query result into the table a chart renderer
//! consumes: grouping and aggregation, series pivoting, row/column
//! switching, and column-wise sorting. It depends on `chart-table` only for
//! the shared value and table types.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the transform IS)
//! - `engine`: Calculation engine (HOW we calculate)
//! - `sort`: Mixed-type column sort
//! - `error`: Failure taxonomy

pub mod definition;
pub mod engine;
pub mod error;
pub mod sort;

pub use definition::{AggregationType, ColumnIndex, TransformDefinition};
pub use engine::{
    switch_rows_and_columns, AggregateAccumulator, TransformCalculator,
    ALL_ROWS_LABEL, NO_VALUE_LABEL,
};
pub use error::TransformError;
pub use sort::sort_table_by_column;

use chart_table::Table;

/// Transforms chart data per the definition, collapsing every failure to
/// `None`.
///
/// This is the compatibility entry point: callers render nothing on `None`
/// and cannot distinguish "empty input" from "invalid parameters", exactly
/// like the stored chart configs expect. Use [`TransformCalculator::run`]
/// for the typed error.
pub fn transform_data(data: &Table, definition: &TransformDefinition) -> Option<Table> {
    TransformCalculator::new(definition, data).run().ok()
}
