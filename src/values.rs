//! Cell values and the helpers that reshape value grids.
//!
//! The Sheets API represents cells as untyped JSON. [`CellValue`] narrows that
//! to the scalars the service actually returns, so the string helpers below
//! can fail with a typed error instead of a runtime fault.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::io::Read;

/// Rows of cells; rows may have different lengths.
pub type Grid = Vec<Vec<CellValue>>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Number(f64),
    Bool(bool),
    #[default]
    Empty,
}

impl CellValue {
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::String(_) => "string",
            CellValue::Number(_) => "number",
            CellValue::Bool(_) => "bool",
            CellValue::Empty => "empty",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Bool(b),
            Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::String(n.to_string())),
            Value::String(s) => CellValue::String(s),
            // The service never returns these for a cell
            other @ (Value::Array(_) | Value::Object(_)) => CellValue::String(other.to_string()),
        }
    }
}

impl From<&CellValue> for Value {
    fn from(cell: &CellValue) -> Self {
        match cell {
            CellValue::String(s) => Value::String(s.clone()),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Empty => Value::Null,
        }
    }
}

/// Convert a response grid into cell values.
pub fn from_json_grid(rows: Vec<Vec<Value>>) -> Grid {
    rows.into_iter()
        .map(|row| row.into_iter().map(CellValue::from).collect())
        .collect()
}

/// Convert cell values into the JSON grid a request body carries.
pub fn to_json_grid(rows: &[Vec<CellValue>]) -> Vec<Vec<Value>> {
    rows.iter()
        .map(|row| row.iter().map(Value::from).collect())
        .collect()
}

/// Flatten row by row: `[[a, b], [c]]` becomes `[a, b, c]`.
pub fn flatten(grid: Grid) -> Vec<CellValue> {
    grid.into_iter().flatten().collect()
}

/// Require every cell to be a string, optionally lower-casing each one.
pub fn to_strings(cells: Vec<CellValue>, to_lower: bool) -> Result<Vec<String>> {
    cells
        .into_iter()
        .enumerate()
        .map(|(index, cell)| match cell {
            CellValue::String(s) if to_lower => Ok(s.to_lowercase()),
            CellValue::String(s) => Ok(s),
            other => Err(AppError::CellType {
                index,
                found: other.kind(),
            }),
        })
        .collect()
}

pub fn to_string_set(strings: Vec<String>) -> HashSet<String> {
    strings.into_iter().collect()
}

/// Read a headerless CSV document into a grid of string cells.
pub fn from_csv<R: Read>(reader: R) -> Result<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(CellValue::from).collect());
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn s(value: &str) -> CellValue {
        CellValue::from(value)
    }

    #[test]
    fn test_flatten_is_row_major() {
        let grid = vec![vec![s("a"), s("b")], vec![s("c")]];
        assert_eq!(flatten(grid), vec![s("a"), s("b"), s("c")]);
    }

    #[test]
    fn test_flatten_empty_grid() {
        assert!(flatten(Vec::new()).is_empty());
        assert!(flatten(vec![Vec::new(), Vec::new()]).is_empty());
    }

    #[test]
    fn test_to_strings_lowercases() {
        let cells = vec![s("Alice"), s("BOB")];
        assert_eq!(to_strings(cells.clone(), false).unwrap(), vec!["Alice", "BOB"]);
        assert_eq!(to_strings(cells, true).unwrap(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_to_strings_rejects_numbers() {
        let cells = vec![s("a"), CellValue::Number(3.0), s("b")];
        match to_strings(cells, false) {
            Err(AppError::CellType { index, found }) => {
                assert_eq!(index, 1);
                assert_eq!(found, "number");
            }
            other => panic!("expected CellType error, got {:?}", other),
        }
    }

    #[test]
    fn test_string_set_dedupes() {
        let set = to_string_set(vec!["x".to_string(), "y".to_string(), "x".to_string()]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("x"));
        assert!(set.contains("y"));
    }

    #[test]
    fn test_from_json_grid() {
        let grid = from_json_grid(vec![
            vec![json!("name"), json!(42), json!(true)],
            vec![json!(null)],
        ]);
        assert_eq!(
            grid,
            vec![
                vec![s("name"), CellValue::Number(42.0), CellValue::Bool(true)],
                vec![CellValue::Empty],
            ]
        );
    }

    #[test]
    fn test_to_json_grid() {
        let grid = vec![vec![s("a"), CellValue::Number(1.5), CellValue::Empty]];
        assert_eq!(
            to_json_grid(&grid),
            vec![vec![json!("a"), json!(1.5), Value::Null]]
        );
    }

    #[test]
    fn test_non_finite_number_becomes_null() {
        assert_eq!(Value::from(&CellValue::Number(f64::NAN)), Value::Null);
    }

    #[test]
    fn test_deserialize_untagged_grid() {
        let grid: Grid = serde_json::from_str(r#"[["a", 1, false], [null]]"#).unwrap();
        assert_eq!(
            grid,
            vec![
                vec![s("a"), CellValue::Number(1.0), CellValue::Bool(false)],
                vec![CellValue::Empty],
            ]
        );
    }

    #[test]
    fn test_from_csv_allows_ragged_rows() {
        let data = "name,score\nalice,10\nbob\n";
        let grid = from_csv(data.as_bytes()).unwrap();
        assert_eq!(
            grid,
            vec![
                vec![s("name"), s("score")],
                vec![s("alice"), s("10")],
                vec![s("bob")],
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(s("x").to_string(), "x");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
        assert_eq!(CellValue::Empty.to_string(), "");
    }
}
