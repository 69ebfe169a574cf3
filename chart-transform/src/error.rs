//! FILENAME: chart-transform/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("input table is empty")]
    EmptyInput,

    #[error("column index {col} out of range for table with {column_count} columns")]
    ColumnOutOfRange { col: i64, column_count: usize },
}
