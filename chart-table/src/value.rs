//! FILENAME: chart-table/src/value.rs
//! PURPOSE: Defines the fundamental value model for chart data tables.
//! CONTEXT: This file contains the `CellValue` enum and the `OrderedFloat`
//! wrapper. Query results arrive as heterogeneous JSON arrays (numbers,
//! strings, booleans, nulls intermixed in one column), so the value type
//! mirrors that wire shape exactly and every numeric operation goes through
//! one explicit coercion step.

use serde::{Deserialize, Serialize};

/// A single cell in a chart data table.
///
/// Serializes untagged so a table round-trips as the plain JSON arrays the
/// front end emits: `null` ⇄ `Empty`, numbers ⇄ `Number`, strings ⇄ `Text`,
/// booleans ⇄ `Boolean`. JS `undefined` does not survive JSON and arrives
/// as `null`; both map to `Empty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl CellValue {
    /// Convenience constructor for text cells.
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Coerces the cell into a number usable for aggregation arithmetic.
    ///
    /// Numbers must be finite. Strings must parse as a finite number after
    /// trimming surrounding whitespace; the parse covers the whole string,
    /// so `"4abc"` is rejected rather than truncated. Everything else
    /// (empty cells, booleans, non-numeric text) is not aggregable.
    pub fn as_aggregable(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => {
                // str::parse would also accept "inf"/"NaN"; the finiteness
                // check rejects those alongside overflowing literals.
                match s.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => Some(v),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Returns the display label for this cell as a String.
    /// Used when cell values become axis labels or column names.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => {
                if *b { "true" } else { "false" }.to_string()
            }
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

/// Wrapper around f64 that implements Eq and Hash for use as HashMap keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}
