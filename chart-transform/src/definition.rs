//! FILENAME: chart-transform/src/definition.rs
//! Transform Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a chart data transform.
//! These structures are designed to be:
//! - Serializable (chart configs are stored alongside documents)
//! - An immutable snapshot of user intent
//!
//! Field names follow the camelCase keys of the stored chart config, so a
//! sparse config like `{"aggregate": true}` deserializes with defaults.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Index into the table columns (0-based).
pub type ColumnIndex = usize;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    Med,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete, serializable definition of a chart data transform.
///
/// `agg_col` stays a signed integer at the serialization boundary because
/// `-1` ("aggregate all rows into one group") is the stored wire format;
/// the engine resolves it to an internal enum during validation and never
/// sees the sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformDefinition {
    /// Run the grouping/aggregation stage.
    pub aggregate: bool,

    /// Run the row/column switch stage (after aggregation, if both are set).
    pub switch: bool,

    /// Grouping key column; -1 aggregates all rows into one group.
    pub agg_col: i64,

    /// Column whose distinct values become output columns.
    pub series_col: Option<ColumnIndex>,

    /// Columns whose values are aggregated. None means every column except
    /// `agg_col` and `series_col`, in ascending index order.
    pub val_cols: Option<Vec<ColumnIndex>>,

    /// Per-column aggregation function; unlisted columns default to Sum.
    pub aggregate_type: HashMap<ColumnIndex, AggregationType>,

    /// Column to sort by after aggregation/switching.
    pub sort_col: Option<ColumnIndex>,

    /// Sort direction.
    pub sort_asc: bool,
}

impl Default for TransformDefinition {
    fn default() -> Self {
        TransformDefinition {
            aggregate: false,
            switch: false,
            agg_col: -1,
            series_col: None,
            val_cols: None,
            aggregate_type: HashMap::new(),
            sort_col: None,
            sort_asc: true,
        }
    }
}

impl TransformDefinition {
    /// Creates a definition that passes the input through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the aggregation stage.
    pub fn with_aggregation(mut self) -> Self {
        self.aggregate = true;
        self
    }

    /// Enables the row/column switch stage.
    pub fn with_switch(mut self) -> Self {
        self.switch = true;
        self
    }

    /// Sets the grouping key column.
    pub fn with_agg_col(mut self, col: ColumnIndex) -> Self {
        self.agg_col = col as i64;
        self
    }

    /// Sets the series column.
    pub fn with_series_col(mut self, col: ColumnIndex) -> Self {
        self.series_col = Some(col);
        self
    }

    /// Sets the value columns explicitly.
    pub fn with_val_cols(mut self, cols: Vec<ColumnIndex>) -> Self {
        self.val_cols = Some(cols);
        self
    }

    /// Sets the aggregation function for one column.
    pub fn with_aggregate_type(mut self, col: ColumnIndex, agg: AggregationType) -> Self {
        self.aggregate_type.insert(col, agg);
        self
    }

    /// Sets the sort column and direction.
    pub fn with_sort(mut self, col: ColumnIndex, ascending: bool) -> Self {
        self.sort_col = Some(col);
        self.sort_asc = ascending;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_config_deserializes_with_defaults() {
        let definition: TransformDefinition =
            serde_json::from_str(r#"{"aggregate": true}"#).unwrap();

        assert!(definition.aggregate);
        assert!(!definition.switch);
        assert_eq!(definition.agg_col, -1);
        assert_eq!(definition.series_col, None);
        assert_eq!(definition.val_cols, None);
        assert!(definition.aggregate_type.is_empty());
        assert!(definition.sort_asc);
    }

    #[test]
    fn test_aggregate_type_map_uses_lowercase_names() {
        let definition: TransformDefinition = serde_json::from_str(
            r#"{"aggregate": true, "aggCol": 0, "aggregateType": {"1": "min", "2": "max", "3": "med"}}"#,
        )
        .unwrap();

        assert_eq!(definition.agg_col, 0);
        assert_eq!(
            definition.aggregate_type.get(&1),
            Some(&AggregationType::Min)
        );
        assert_eq!(
            definition.aggregate_type.get(&2),
            Some(&AggregationType::Max)
        );
        assert_eq!(
            definition.aggregate_type.get(&3),
            Some(&AggregationType::Med)
        );
    }

    #[test]
    fn test_config_round_trip() {
        let definition = TransformDefinition::new()
            .with_aggregation()
            .with_agg_col(0)
            .with_series_col(1)
            .with_val_cols(vec![2])
            .with_aggregate_type(2, AggregationType::Avg)
            .with_sort(1, false);

        let json = serde_json::to_string(&definition).unwrap();
        let back: TransformDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, definition);
    }
}
