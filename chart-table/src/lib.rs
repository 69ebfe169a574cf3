//! FILENAME: chart-table/src/lib.rs
//! PURPOSE: Main library entry point for the chart table data model.
//! CONTEXT: Re-exports the shared value and table types for use by the
//! transform crates.

pub mod table;
pub mod value;

// Re-export commonly used types at the crate root
pub use table::Table;
pub use value::{CellValue, OrderedFloat};
