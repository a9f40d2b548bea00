use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::data::value::Scalar;
use crate::error::{ForgeError, Result};

const NOT_RECORD_LIKE: &str =
    "Wrong type of input. Must be a list of records or a mapping of columns";

/// Column-major table of scalars.
///
/// Every column has exactly `row_count` cells; keys absent from a record are
/// stored as `Scalar::Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub column_data: Vec<Vec<Scalar>>, // column_data[col_idx][row_idx]
    pub row_count: usize,
}

impl Dataset {
    /// Build a dataset from named columns. All columns must have equal length.
    pub fn from_columns(columns: Vec<(String, Vec<Scalar>)>) -> Result<Self> {
        let row_count = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        if columns.iter().any(|(_, c)| c.len() != row_count) {
            return Err(ForgeError::input_shape("All columns must be of the same length"));
        }
        let mut dataset = Dataset {
            row_count,
            ..Default::default()
        };
        let mut seen: HashSet<String> = HashSet::with_capacity(columns.len());
        for (name, data) in columns {
            if !seen.insert(name.clone()) {
                return Err(ForgeError::input_shape(format!("Duplicate column name '{name}'")));
            }
            dataset.columns.push(name);
            dataset.column_data.push(data);
        }
        Ok(dataset)
    }

    /// Build a dataset from a header and row-major cells. Short rows are
    /// padded with nulls; extra cells are dropped with a warning.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self> {
        let num_cols = columns.len();
        let row_count = rows.len();
        let mut column_data: Vec<Vec<Scalar>> = vec![Vec::with_capacity(row_count); num_cols];

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() > num_cols {
                tracing::warn!(
                    "Row {} has {} cells but the header has {} columns; dropping the extra cells",
                    row_idx + 1,
                    row.len(),
                    num_cols
                );
            }
            let mut cells = row.into_iter();
            for col_data in column_data.iter_mut() {
                col_data.push(cells.next().unwrap_or(Scalar::Null));
            }
        }

        Dataset::from_columns(columns.into_iter().zip(column_data).collect())
    }

    /// Build a dataset from any of the accepted JSON shapes:
    /// a list of records, a mapping of column to list, or a mapping of
    /// column to a mapping of row label to value.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => Self::from_records(items),
            Value::Object(map) => Self::from_column_map(map),
            _ => Err(ForgeError::input_shape(NOT_RECORD_LIKE)),
        }
    }

    fn from_records(items: &[Value]) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for item in items {
            let record = item
                .as_object()
                .ok_or_else(|| ForgeError::input_shape(NOT_RECORD_LIKE))?;
            for key in record.keys() {
                if seen.insert(key) {
                    columns.push(key.clone());
                }
            }
        }

        let data = columns
            .iter()
            .map(|name| {
                let cells = items
                    .iter()
                    .map(|item| item.get(name).map(Scalar::from).unwrap_or(Scalar::Null))
                    .collect();
                (name.clone(), cells)
            })
            .collect();
        Self::from_columns(data)
    }

    fn from_column_map(map: &Map<String, Value>) -> Result<Self> {
        if map.values().all(Value::is_array) {
            let data = map
                .iter()
                .map(|(name, v)| {
                    let cells = v
                        .as_array()
                        .map(|arr| arr.iter().map(Scalar::from).collect())
                        .unwrap_or_default();
                    (name.clone(), cells)
                })
                .collect();
            return Self::from_columns(data);
        }

        if map.values().all(Value::is_object) {
            // Row labels are unioned in first-seen order, like an index.
            let mut labels: Vec<&str> = Vec::new();
            let mut seen: HashSet<&str> = HashSet::new();
            for inner in map.values().filter_map(Value::as_object) {
                for label in inner.keys() {
                    if seen.insert(label) {
                        labels.push(label);
                    }
                }
            }
            let data = map
                .iter()
                .map(|(name, v)| {
                    let cells = labels
                        .iter()
                        .map(|label| v.get(*label).map(Scalar::from).unwrap_or(Scalar::Null))
                        .collect();
                    (name.clone(), cells)
                })
                .collect();
            return Self::from_columns(data);
        }

        if map.values().any(|v| !v.is_array() && !v.is_object()) {
            return Err(ForgeError::input_shape(
                "If using all scalar values, you must pass a list of records",
            ));
        }
        Err(ForgeError::input_shape(
            "Mixing list and mapping columns is not supported",
        ))
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when there is nothing to describe: no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[Scalar]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.column_data[idx].as_slice())
    }

    /// Iterate `(name, cells)` in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Scalar])> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.column_data.iter().map(Vec::as_slice))
    }

    /// First `n` rows, row-major.
    pub fn head(&self, n: usize) -> Vec<Vec<&Scalar>> {
        (0..self.row_count.min(n))
            .map(|row| self.column_data.iter().map(|col| &col[row]).collect())
            .collect()
    }
}
