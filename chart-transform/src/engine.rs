//! FILENAME: chart-transform/src/engine.rs
//! Transform Engine - The calculation core that turns a query result into
//! the table a chart renderer consumes.
//!
//! This module takes a TransformDefinition (configuration) and a Table
//! (data) and produces a new Table.
//!
//! Algorithm:
//! 1. Validate and resolve the configured column indices
//! 2. Intern group keys (and series keys) in first-seen order
//! 3. Accumulate per-bucket aggregate state in one pass over the rows
//! 4. Reduce each bucket per its column's aggregation function
//! 5. Apply the row/column switch and the column sort as requested

use log::{debug, trace};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use chart_table::{CellValue, OrderedFloat, Table};
use crate::definition::{AggregationType, ColumnIndex, TransformDefinition};
use crate::error::TransformError;
use crate::sort::sort_table_by_column;

/// Group label used when all rows collapse into one synthetic group.
pub const ALL_ROWS_LABEL: &str = "Aggregated Values";

/// Cell content for a (group, series) pair no input row matched.
/// Distinct from "rows matched but none were numeric", which yields the
/// aggregate's empty-list result instead.
pub const NO_VALUE_LABEL: &str = "No Value";

// ============================================================================
// VALUE INTERNING
// ============================================================================

/// A hashable mirror of `CellValue`, usable as a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
}

impl From<&CellValue> for CacheKey {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => CacheKey::Empty,
            CellValue::Number(n) => CacheKey::Number(OrderedFloat(*n)),
            CellValue::Text(s) => CacheKey::Text(s.clone()),
            CellValue::Boolean(b) => CacheKey::Boolean(*b),
        }
    }
}

/// Interns cell values, assigning dense ids in first-seen order.
/// Group and series keys are emitted in exactly this order, never sorted.
#[derive(Debug, Default)]
struct ValueInterner {
    ids: FxHashMap<CacheKey, usize>,
    values: Vec<CellValue>,
}

impl ValueInterner {
    fn new() -> Self {
        ValueInterner::default()
    }

    /// Interns a value and returns its id.
    /// If the value was seen before, returns the existing id.
    fn intern(&mut self, value: &CellValue) -> usize {
        let key = CacheKey::from(value);
        if let Some(&id) = self.ids.get(&key) {
            return id;
        }
        let id = self.values.len();
        self.values.push(value.clone());
        self.ids.insert(key, id);
        id
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn values(&self) -> &[CellValue] {
        &self.values
    }
}

// ============================================================================
// AGGREGATE ACCUMULATOR
// ============================================================================

/// Accumulator for computing aggregates in one pass.
///
/// `rows_seen` counts every row routed to the bucket, numeric or not; it is
/// what distinguishes an empty intersection (no rows at all) from a bucket
/// whose rows held nothing aggregable. The raw values are kept because Med
/// needs the full list.
#[derive(Debug, Clone, Default)]
pub struct AggregateAccumulator {
    rows_seen: u64,
    sum: f64,
    count: u64,
    min: Option<f64>,
    max: Option<f64>,
    values: Vec<f64>,
}

impl AggregateAccumulator {
    pub fn new() -> Self {
        AggregateAccumulator::default()
    }

    /// Records that a row matched this bucket.
    pub fn add_row(&mut self) {
        self.rows_seen += 1;
    }

    /// Adds a coerced numeric value to the accumulator.
    pub fn add_number(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.values.push(value);
    }

    /// Computes the final numeric aggregate value.
    pub fn compute(&self, aggregation: AggregationType) -> f64 {
        match aggregation {
            AggregationType::Sum => self.sum,
            AggregationType::Count => self.count as f64,
            AggregationType::Avg => {
                if self.count > 0 {
                    (self.sum / self.count as f64).round()
                } else {
                    0.0
                }
            }
            AggregationType::Min => self.min.unwrap_or(0.0),
            AggregationType::Max => self.max.unwrap_or(0.0),
            AggregationType::Med => self.median(),
        }
    }

    /// Median of the collected values. Even-length lists average the two
    /// central values and round; odd-length lists return the central value.
    fn median(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            ((sorted[mid - 1] + sorted[mid]) / 2.0).round()
        } else {
            sorted[mid]
        }
    }

    /// Renders the bucket into an output cell.
    pub fn result(&self, aggregation: AggregationType) -> CellValue {
        if self.rows_seen == 0 {
            CellValue::text(NO_VALUE_LABEL)
        } else {
            CellValue::Number(self.compute(aggregation))
        }
    }
}

// ============================================================================
// RESOLVED CONFIGURATION
// ============================================================================

/// The grouping key, after the -1 sentinel has been resolved away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupColumn {
    /// All rows collapse into one group labelled `ALL_ROWS_LABEL`.
    AllRows,
    /// Rows group by the value at this column.
    Column(ColumnIndex),
}

/// Validated column roles for one aggregation run.
#[derive(Debug)]
struct ResolvedAggregation {
    group_col: GroupColumn,
    series_col: Option<ColumnIndex>,
    val_cols: SmallVec<[ColumnIndex; 4]>,
}

// ============================================================================
// TRANSFORM CALCULATOR
// ============================================================================

/// The calculation engine for chart data transforms.
///
/// Short-lived: borrows the definition and the input table, runs the staged
/// pipeline, and emits a new table. The input is never mutated.
pub struct TransformCalculator<'a> {
    definition: &'a TransformDefinition,
    table: &'a Table,
}

impl<'a> TransformCalculator<'a> {
    /// Creates a new calculator instance.
    pub fn new(definition: &'a TransformDefinition, table: &'a Table) -> Self {
        TransformCalculator { definition, table }
    }

    /// Executes the full pipeline and returns the transformed table.
    pub fn run(&self) -> Result<Table, TransformError> {
        // Step 1: reject empty input before any other work
        if self.table.is_empty() {
            return Err(TransformError::EmptyInput);
        }

        debug!(
            "transform: {} data rows, aggregate={}, switch={}, sort_col={:?}",
            self.table.data_rows().len(),
            self.definition.aggregate,
            self.definition.switch,
            self.definition.sort_col,
        );

        // Step 2: grouping and aggregation
        let mut result = if self.definition.aggregate {
            self.aggregate()?
        } else {
            self.table.clone()
        };

        // Step 3: row/column switch
        if self.definition.switch {
            result = switch_rows_and_columns(&result);
        }

        // Step 4: column sort, against the table as transformed so far
        if let Some(sort_col) = self.definition.sort_col {
            result = sort_table_by_column(&result, sort_col, self.definition.sort_asc)?;
        }

        Ok(result)
    }

    // ========================================================================
    // AGGREGATION
    // ========================================================================

    fn aggregate(&self) -> Result<Table, TransformError> {
        let resolved = self.resolve_aggregation()?;
        trace!("aggregate: resolved {:?}", resolved);

        match resolved.series_col {
            Some(series_col) => self.aggregate_with_series(&resolved, series_col),
            None => self.aggregate_value_columns(&resolved),
        }
    }

    /// Validates the configured indices against the table and resolves the
    /// agg_col sentinel. Runs before any output is built: an out-of-range
    /// index fails the whole call, never a partial table.
    fn resolve_aggregation(&self) -> Result<ResolvedAggregation, TransformError> {
        let column_count = self.table.column_count();

        let check = |col: ColumnIndex| -> Result<ColumnIndex, TransformError> {
            if col < column_count {
                Ok(col)
            } else {
                Err(TransformError::ColumnOutOfRange {
                    col: col as i64,
                    column_count,
                })
            }
        };

        let group_col = match self.definition.agg_col {
            -1 => GroupColumn::AllRows,
            c if c >= 0 && (c as usize) < column_count => GroupColumn::Column(c as usize),
            c => {
                return Err(TransformError::ColumnOutOfRange {
                    col: c,
                    column_count,
                })
            }
        };

        let series_col = match self.definition.series_col {
            Some(c) => Some(check(c)?),
            None => None,
        };

        let val_cols: SmallVec<[ColumnIndex; 4]> = match &self.definition.val_cols {
            Some(cols) => {
                for &c in cols {
                    check(c)?;
                }
                cols.iter().copied().collect()
            }
            None => {
                // The defaulted measure set never includes the chart's key
                // column: the group column when one is set, column 0 when
                // all rows collapse into the synthetic group (its label
                // takes the key position in the output).
                let key_col = match group_col {
                    GroupColumn::AllRows => 0,
                    GroupColumn::Column(c) => c,
                };
                (0..column_count)
                    .filter(|&c| c != key_col && series_col != Some(c))
                    .collect()
            }
        };

        Ok(ResolvedAggregation {
            group_col,
            series_col,
            val_cols,
        })
    }

    /// The aggregation function configured for a column (Sum when unlisted).
    fn aggregation_for(&self, col: ColumnIndex) -> AggregationType {
        self.definition
            .aggregate_type
            .get(&col)
            .copied()
            .unwrap_or_default()
    }

    /// Routes a row to its group id, interning the group key.
    fn group_id_for_row(
        &self,
        groups: &mut ValueInterner,
        group_col: GroupColumn,
        row: &[CellValue],
    ) -> usize {
        match group_col {
            GroupColumn::AllRows => groups.intern(&CellValue::text(ALL_ROWS_LABEL)),
            GroupColumn::Column(c) => {
                groups.intern(row.get(c).unwrap_or(&CellValue::Empty))
            }
        }
    }

    /// Header cell naming the group column ('' for the synthetic group).
    fn group_header_cell(&self, group_col: GroupColumn) -> CellValue {
        match group_col {
            GroupColumn::AllRows => CellValue::text(""),
            GroupColumn::Column(c) => CellValue::Text(self.table.column_name(c)),
        }
    }

    /// No-series aggregation: one output column per value column, reduced
    /// by that column's configured function.
    fn aggregate_value_columns(
        &self,
        resolved: &ResolvedAggregation,
    ) -> Result<Table, TransformError> {
        let mut groups = ValueInterner::new();
        // buckets[group][slot] where slot parallels resolved.val_cols
        let mut buckets: Vec<Vec<AggregateAccumulator>> = Vec::new();

        for row in self.table.data_rows() {
            let group_id = self.group_id_for_row(&mut groups, resolved.group_col, row);
            if buckets.len() <= group_id {
                buckets.push(vec![AggregateAccumulator::new(); resolved.val_cols.len()]);
            }
            for (slot, &val_col) in resolved.val_cols.iter().enumerate() {
                let acc = &mut buckets[group_id][slot];
                acc.add_row();
                if let Some(v) = row.get(val_col).and_then(|cell| cell.as_aggregable()) {
                    acc.add_number(v);
                }
            }
        }

        debug!(
            "aggregate: {} groups x {} value columns",
            groups.len(),
            resolved.val_cols.len()
        );

        let mut rows = Vec::with_capacity(groups.len() + 1);

        let mut header = Vec::with_capacity(resolved.val_cols.len() + 1);
        header.push(self.group_header_cell(resolved.group_col));
        for &val_col in &resolved.val_cols {
            header.push(CellValue::Text(self.table.column_name(val_col)));
        }
        rows.push(header);

        for (group_id, group_value) in groups.values().iter().enumerate() {
            let mut row = Vec::with_capacity(resolved.val_cols.len() + 1);
            row.push(group_value.clone());
            for (slot, &val_col) in resolved.val_cols.iter().enumerate() {
                row.push(buckets[group_id][slot].result(self.aggregation_for(val_col)));
            }
            rows.push(row);
        }

        Ok(Table::from_rows(rows))
    }

    /// Series aggregation: distinct series values become the output columns,
    /// replacing the per-value-column layout. A (group, series) pair with no
    /// matching rows renders `NO_VALUE_LABEL`.
    ///
    /// The function applied to every cell is the one configured for the
    /// first value column: a series layout has a single logical measure,
    /// spread across series buckets.
    fn aggregate_with_series(
        &self,
        resolved: &ResolvedAggregation,
        series_col: ColumnIndex,
    ) -> Result<Table, TransformError> {
        let mut groups = ValueInterner::new();
        let mut series = ValueInterner::new();
        // buckets[group] maps series id -> accumulator; an absent entry is
        // an empty intersection
        let mut buckets: Vec<FxHashMap<usize, AggregateAccumulator>> = Vec::new();

        for row in self.table.data_rows() {
            let group_id = self.group_id_for_row(&mut groups, resolved.group_col, row);
            if buckets.len() <= group_id {
                buckets.push(FxHashMap::default());
            }

            let series_id = series.intern(row.get(series_col).unwrap_or(&CellValue::Empty));
            let acc = buckets[group_id].entry(series_id).or_default();
            acc.add_row();
            for &val_col in &resolved.val_cols {
                if let Some(v) = row.get(val_col).and_then(|cell| cell.as_aggregable()) {
                    acc.add_number(v);
                }
            }
        }

        debug!(
            "aggregate: {} groups x {} series values",
            groups.len(),
            series.len()
        );

        let aggregation = resolved
            .val_cols
            .first()
            .map(|&c| self.aggregation_for(c))
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(groups.len() + 1);

        let mut header = Vec::with_capacity(series.len() + 1);
        header.push(self.group_header_cell(resolved.group_col));
        header.extend(series.values().iter().cloned());
        rows.push(header);

        for (group_id, group_value) in groups.values().iter().enumerate() {
            let mut row = Vec::with_capacity(series.len() + 1);
            row.push(group_value.clone());
            for series_id in 0..series.len() {
                match buckets[group_id].get(&series_id) {
                    Some(acc) => row.push(acc.result(aggregation)),
                    None => row.push(CellValue::text(NO_VALUE_LABEL)),
                }
            }
            rows.push(row);
        }

        Ok(Table::from_rows(rows))
    }
}

// ============================================================================
// ROW/COLUMN SWITCH
// ============================================================================

/// Transposes the table: the former header becomes the first output column
/// and the former first column (header name plus its values) becomes the
/// output header. Ragged rows transpose as `Empty` in missing positions.
pub fn switch_rows_and_columns(table: &Table) -> Table {
    let rows = table.rows();
    let height = rows.len();
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);

    let mut out = Vec::with_capacity(width);
    for col in 0..width {
        let mut new_row = Vec::with_capacity(height);
        for row in rows {
            new_row.push(row.get(col).cloned().unwrap_or(CellValue::Empty));
        }
        out.push(new_row);
    }

    Table::from_rows(out)
}
