//! FILENAME: tests/transform_fixtures.rs
//! Integration tests for the chart data transform pipeline.

use chart_table::{CellValue, Table};
use chart_transform::{
    transform_data, AggregationType, TransformCalculator, TransformDefinition, TransformError,
};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// The reference time-series fixture used across the suite.
fn test_data() -> Table {
    Table::from_rows(vec![
        vec!["time".into(), "type1".into(), "type2".into(), "type3".into()],
        vec!["2001-01-02".into(), 4.0.into(), 9.0.into(), 100.0.into()],
        vec!["2001-01-03".into(), 2.0.into(), 10.0.into(), 100.0.into()],
        vec!["2001-01-02".into(), 3.0.into(), 10.0.into(), 100.0.into()],
        vec!["2001-01-03".into(), 4.0.into(), 10.0.into(), 100.0.into()],
        vec!["2001-01-01".into(), 5.0.into(), 10.0.into(), 100.0.into()],
        vec!["2001-01-01".into(), 6.0.into(), 11.0.into(), 1.0.into()],
    ])
}

fn rows(table: &Table) -> &[Vec<CellValue>] {
    table.rows()
}

// ============================================================================
// FULL-ROW AGGREGATION
// ============================================================================

#[test]
fn test_all_rows_aggregate_with_default_sums() {
    let definition = TransformDefinition::new().with_aggregation();

    let result = transform_data(&test_data(), &definition).unwrap();
    assert_eq!(
        rows(&result),
        &[
            vec!["".into(), "type1".into(), "type2".into(), "type3".into()],
            vec![
                "Aggregated Values".into(),
                24.0.into(),
                60.0.into(),
                501.0.into(),
            ],
        ]
    );
}

#[test]
fn test_all_rows_aggregate_with_per_column_functions() {
    let definition = TransformDefinition::new()
        .with_aggregation()
        .with_aggregate_type(1, AggregationType::Min)
        .with_aggregate_type(2, AggregationType::Max)
        .with_aggregate_type(3, AggregationType::Med);

    let result = transform_data(&test_data(), &definition).unwrap();
    assert_eq!(
        rows(&result),
        &[
            vec!["".into(), "type1".into(), "type2".into(), "type3".into()],
            vec![
                "Aggregated Values".into(),
                2.0.into(),
                11.0.into(),
                100.0.into(),
            ],
        ]
    );
}

#[test]
fn test_count_counts_only_coercible_cells() {
    let input = Table::from_rows(vec![
        vec!["k".into(), "v".into(), "w".into()],
        vec!["a".into(), 4.0.into(), "q".into()],
        vec!["a".into(), "x".into(), "r".into()],
        vec!["a".into(), CellValue::Empty, "s".into()],
        vec!["a".into(), "5".into(), "t".into()],
    ]);
    let definition = TransformDefinition::new()
        .with_aggregation()
        .with_aggregate_type(1, AggregationType::Count)
        .with_aggregate_type(2, AggregationType::Count);

    let result = transform_data(&input, &definition).unwrap();
    // "v" has two coercible cells; "w" has rows but nothing coercible
    assert_eq!(
        result.data_rows(),
        &[vec!["Aggregated Values".into(), 2.0.into(), 0.0.into()]]
    );
}

#[test]
fn test_avg_rounds_to_nearest_integer() {
    let definition = TransformDefinition::new()
        .with_aggregation()
        .with_val_cols(vec![2])
        .with_aggregate_type(2, AggregationType::Avg);

    let result = transform_data(&test_data(), &definition).unwrap();
    // average of 9,10,10,10,10,11 is exactly 10
    assert_eq!(
        result.data_rows(),
        &[vec!["Aggregated Values".into(), 10.0.into()]]
    );
}

// ============================================================================
// GROUPED AGGREGATION
// ============================================================================

#[test]
fn test_grouped_aggregation_keeps_first_seen_group_order() {
    let definition = TransformDefinition::new().with_aggregation().with_agg_col(0);

    let result = transform_data(&test_data(), &definition).unwrap();
    assert_eq!(
        rows(&result),
        &[
            vec!["time".into(), "type1".into(), "type2".into(), "type3".into()],
            vec!["2001-01-02".into(), 7.0.into(), 19.0.into(), 200.0.into()],
            vec!["2001-01-03".into(), 6.0.into(), 20.0.into(), 200.0.into()],
            vec!["2001-01-01".into(), 11.0.into(), 21.0.into(), 101.0.into()],
        ]
    );
}

#[test]
fn test_grouped_aggregation_with_series_emits_no_value_for_gaps() {
    let input = Table::from_rows(vec![
        vec!["date".into(), "metric".into(), "value".into()],
        vec!["d1".into(), "a".into(), 1.0.into()],
        vec!["d1".into(), "b".into(), 2.0.into()],
        vec!["d2".into(), "a".into(), 3.0.into()],
    ]);
    let definition = TransformDefinition::new()
        .with_aggregation()
        .with_agg_col(0)
        .with_series_col(1)
        .with_val_cols(vec![2]);

    let result = transform_data(&input, &definition).unwrap();
    assert_eq!(
        rows(&result),
        &[
            vec!["date".into(), "a".into(), "b".into()],
            vec!["d1".into(), 1.0.into(), 2.0.into()],
            vec!["d2".into(), 3.0.into(), "No Value".into()],
        ]
    );
}

#[test]
fn test_series_gap_differs_from_rows_with_invalid_values() {
    let input = Table::from_rows(vec![
        vec!["date".into(), "metric".into(), "value".into()],
        vec!["d1".into(), "a".into(), "garbage".into()],
        vec!["d2".into(), "b".into(), 5.0.into()],
    ]);
    let definition = TransformDefinition::new()
        .with_aggregation()
        .with_agg_col(0)
        .with_series_col(1)
        .with_val_cols(vec![2]);

    let result = transform_data(&input, &definition).unwrap();
    // (d1, a) has a row whose value failed coercion: sum of nothing is 0.
    // (d1, b) has no rows at all: "No Value".
    assert_eq!(
        result.data_rows(),
        &[
            vec!["d1".into(), 0.0.into(), "No Value".into()],
            vec!["d2".into(), "No Value".into(), 5.0.into()],
        ]
    );
}

// ============================================================================
// ROW/COLUMN SWITCH
// ============================================================================

#[test]
fn test_switch_row_col() {
    let definition = TransformDefinition::new().with_switch();

    let result = transform_data(&test_data(), &definition).unwrap();
    assert_eq!(
        rows(&result),
        &[
            vec![
                "time".into(),
                "2001-01-02".into(),
                "2001-01-03".into(),
                "2001-01-02".into(),
                "2001-01-03".into(),
                "2001-01-01".into(),
                "2001-01-01".into(),
            ],
            vec![
                "type1".into(),
                4.0.into(),
                2.0.into(),
                3.0.into(),
                4.0.into(),
                5.0.into(),
                6.0.into(),
            ],
            vec![
                "type2".into(),
                9.0.into(),
                10.0.into(),
                10.0.into(),
                10.0.into(),
                10.0.into(),
                11.0.into(),
            ],
            vec![
                "type3".into(),
                100.0.into(),
                100.0.into(),
                100.0.into(),
                100.0.into(),
                100.0.into(),
                1.0.into(),
            ],
        ]
    );
}

#[test]
fn test_switch_twice_round_trips() {
    let definition = TransformDefinition::new().with_switch();

    let once = transform_data(&test_data(), &definition).unwrap();
    let twice = transform_data(&once, &definition).unwrap();
    assert_eq!(twice, test_data());
}

#[test]
fn test_all_rows_aggregate_and_switch_work_together() {
    let definition = TransformDefinition::new().with_aggregation().with_switch();

    let result = transform_data(&test_data(), &definition).unwrap();
    assert_eq!(
        rows(&result),
        &[
            vec!["".into(), "Aggregated Values".into()],
            vec!["type1".into(), 24.0.into()],
            vec!["type2".into(), 60.0.into()],
            vec!["type3".into(), 501.0.into()],
        ]
    );
}

// ============================================================================
// SORTING
// ============================================================================

#[test]
fn test_sort_after_grouped_aggregation() {
    let definition = TransformDefinition::new()
        .with_aggregation()
        .with_agg_col(0)
        .with_sort(1, true);

    let result = transform_data(&test_data(), &definition).unwrap();
    // groups ordered by their type1 sums: 6, 7, 11
    assert_eq!(
        result.data_rows(),
        &[
            vec!["2001-01-03".into(), 6.0.into(), 20.0.into(), 200.0.into()],
            vec!["2001-01-02".into(), 7.0.into(), 19.0.into(), 200.0.into()],
            vec!["2001-01-01".into(), 11.0.into(), 21.0.into(), 101.0.into()],
        ]
    );
}

#[test]
fn test_sort_descending_without_aggregation() {
    let definition = TransformDefinition::new().with_sort(1, false);

    let result = transform_data(&test_data(), &definition).unwrap();
    let type1: Vec<&CellValue> = result.data_rows().iter().map(|r| &r[1]).collect();
    assert_eq!(
        type1,
        vec![
            &CellValue::Number(6.0),
            &CellValue::Number(5.0),
            &CellValue::Number(4.0),
            &CellValue::Number(4.0),
            &CellValue::Number(3.0),
            &CellValue::Number(2.0),
        ]
    );
}

// ============================================================================
// FAILURE MODES
// ============================================================================

#[test]
fn test_empty_data_returns_none() {
    let definition = TransformDefinition::new().with_aggregation();
    assert_eq!(transform_data(&Table::from_rows(vec![]), &definition), None);
}

#[test]
fn test_out_of_range_agg_col_returns_none() {
    let definition = TransformDefinition::new().with_aggregation().with_agg_col(10);
    assert_eq!(transform_data(&test_data(), &definition), None);
}

#[test]
fn test_out_of_range_val_col_returns_none() {
    let definition = TransformDefinition::new()
        .with_aggregation()
        .with_val_cols(vec![1, 99]);
    assert_eq!(transform_data(&test_data(), &definition), None);
}

#[test]
fn test_out_of_range_sort_col_returns_none() {
    let definition = TransformDefinition::new().with_sort(50, true);
    assert_eq!(transform_data(&test_data(), &definition), None);
}

#[test]
fn test_bad_indices_are_ignored_when_aggregation_is_off() {
    // agg_col is only validated when the aggregation stage runs
    let mut definition = TransformDefinition::new();
    definition.agg_col = 10;

    let result = transform_data(&test_data(), &definition).unwrap();
    assert_eq!(result, test_data());
}

#[test]
fn test_typed_errors_from_the_calculator() {
    let definition = TransformDefinition::new().with_aggregation().with_agg_col(10);
    let err = TransformCalculator::new(&definition, &test_data())
        .run()
        .unwrap_err();
    assert_eq!(
        err,
        TransformError::ColumnOutOfRange {
            col: 10,
            column_count: 4
        }
    );

    let err = TransformCalculator::new(&definition, &Table::from_rows(vec![]))
        .run()
        .unwrap_err();
    assert_eq!(err, TransformError::EmptyInput);
}

// ============================================================================
// CONFIG WIRE FORMAT
// ============================================================================

#[test]
fn test_stored_config_drives_the_pipeline() {
    let definition: TransformDefinition = serde_json::from_str(
        r#"{"aggregate": true, "aggCol": -1, "aggregateType": {"1": "min", "2": "max", "3": "med"}}"#,
    )
    .unwrap();

    let result = transform_data(&test_data(), &definition).unwrap();
    assert_eq!(
        result.data_rows(),
        &[vec![
            "Aggregated Values".into(),
            2.0.into(),
            11.0.into(),
            100.0.into(),
        ]]
    );
}

#[test]
fn test_table_fixture_parses_from_json() {
    let json = r#"[
        ["time", "type1"],
        ["2001-01-02", 4],
        ["2001-01-03", null]
    ]"#;
    let table: Table = serde_json::from_str(json).unwrap();
    assert_eq!(table.cell(1, 1), &CellValue::Number(4.0));
    assert_eq!(table.cell(2, 1), &CellValue::Empty);
}
