// Tabular input domain model - column-oriented view of untyped JSON tables
use crate::domain::series::{RawValue, SeriesPoint, ValueSeries};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("unsupported table shape: expected an object of columns or a list of records, got {0}")]
    UnsupportedShape(&'static str),
    #[error("column '{column}' has unsupported shape: {kind}")]
    UnsupportedColumn { column: String, kind: &'static str },
    #[error("row {row} is not a record")]
    NotARecord { row: usize },
    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        found: usize,
        expected: usize,
    },
    #[error("value column '{0}' not found")]
    MissingColumn(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Value>,
}

/// Ordered columns of equal length, as uploaded by the client.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    columns: Vec<Column>,
    rows: usize,
}

impl DataTable {
    /// Build a table from any of the accepted JSON shapes:
    /// column-dict of index-dicts, column-dict of arrays, or list of records.
    pub fn from_json(value: &Value) -> Result<Self, TableError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(columns) => Self::from_columns(columns),
            Value::Array(records) => Self::from_records(records),
            other => Err(TableError::UnsupportedShape(json_kind(other))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Extract the (label, raw value) series used by the checks.
    ///
    /// The label column is `label_column` when given and present, otherwise the
    /// first column that is not the value column. Rows without a label fall back
    /// to their row index.
    pub fn value_series(
        &self,
        value_column: &str,
        label_column: Option<&str>,
    ) -> Result<ValueSeries, TableError> {
        let values = self
            .column(value_column)
            .ok_or_else(|| TableError::MissingColumn(value_column.to_string()))?;

        let labels = label_column
            .and_then(|name| self.column(name))
            .or_else(|| self.columns.iter().find(|c| c.name != value_column));

        let points = values
            .cells
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                let label = labels
                    .and_then(|c| c.cells.get(row))
                    .and_then(label_text)
                    .unwrap_or_else(|| row.to_string());
                SeriesPoint::new(label, RawValue::from(cell))
            })
            .collect();

        Ok(ValueSeries::new(points))
    }

    /// Single-line records JSON, e.g. `[{"Date":"2020-01-07","Value":5}]`.
    pub fn to_compact_json(&self) -> String {
        let records: Vec<Value> = (0..self.rows)
            .map(|row| {
                let record: Map<String, Value> = self
                    .columns
                    .iter()
                    .map(|c| {
                        let cell = c.cells.get(row).cloned().unwrap_or(Value::Null);
                        (c.name.clone(), cell)
                    })
                    .collect();
                Value::Object(record)
            })
            .collect();

        Value::Array(records).to_string()
    }

    fn from_columns(columns: &Map<String, Value>) -> Result<Self, TableError> {
        // Index-dict columns may be sparse; collect the union of row keys first
        let mut index_keys: Vec<&str> = columns
            .values()
            .filter_map(Value::as_object)
            .flat_map(|cells| cells.keys().map(String::as_str))
            .collect();
        index_keys.sort_by(|a, b| compare_index_keys(a, b));
        index_keys.dedup();

        let mut table_columns = Vec::with_capacity(columns.len());
        for (name, cells) in columns {
            let cells = match cells {
                Value::Object(by_index) => index_keys
                    .iter()
                    .map(|key| by_index.get(*key).cloned().unwrap_or(Value::Null))
                    .collect(),
                Value::Array(items) => items.clone(),
                other => {
                    return Err(TableError::UnsupportedColumn {
                        column: name.clone(),
                        kind: json_kind(other),
                    });
                }
            };
            table_columns.push(Column {
                name: name.clone(),
                cells,
            });
        }

        let rows = table_columns.first().map(|c| c.cells.len()).unwrap_or(0);
        if let Some(ragged) = table_columns.iter().find(|c| c.cells.len() != rows) {
            return Err(TableError::RaggedColumn {
                column: ragged.name.clone(),
                found: ragged.cells.len(),
                expected: rows,
            });
        }

        Ok(Self {
            columns: table_columns,
            rows,
        })
    }

    fn from_records(records: &[Value]) -> Result<Self, TableError> {
        let mut columns: Vec<Column> = Vec::new();

        for (row, record) in records.iter().enumerate() {
            let record = record
                .as_object()
                .ok_or(TableError::NotARecord { row })?;

            for (name, cell) in record {
                match columns.iter_mut().find(|c| &c.name == name) {
                    Some(column) => {
                        column.cells.resize(row, Value::Null);
                        column.cells.push(cell.clone());
                    }
                    None => {
                        let mut cells = vec![Value::Null; row];
                        cells.push(cell.clone());
                        columns.push(Column {
                            name: name.clone(),
                            cells,
                        });
                    }
                }
            }
        }

        let rows = records.len();
        for column in &mut columns {
            column.cells.resize(rows, Value::Null);
        }

        Ok(Self { columns, rows })
    }
}

/// Numeric keys in numeric order, then any other keys lexically.
fn compare_index_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn label_text(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_dict_rows_follow_numeric_key_order() {
        let raw = json!({
            "Date": {"0": "a", "1": "b", "2": "c", "10": "k"},
            "Value": {"0": 1, "1": 2, "2": 3, "10": 11}
        });
        let table = DataTable::from_json(&raw).unwrap();
        assert_eq!(table.len(), 4);

        let series = table.value_series("Value", None).unwrap();
        let labels: Vec<&str> = series.points().iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c", "k"]);
    }

    #[test]
    fn test_sparse_index_dict_fills_missing_cells() {
        let raw = json!({
            "Date": {"0": "a", "1": "b"},
            "Value": {"0": 5}
        });
        let table = DataTable::from_json(&raw).unwrap();
        let series = table.value_series("Value", None).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[1].value, RawValue::Missing);
    }

    #[test]
    fn test_records_shape() {
        let raw = json!([
            {"Date": "2020-01-01", "Value": "10"},
            {"Date": "2020-01-02", "Value": 9}
        ]);
        let table = DataTable::from_json(&raw).unwrap();
        let series = table.value_series("Value", Some("Date")).unwrap();
        assert_eq!(series.points()[0].label, "2020-01-01");
        assert_eq!(series.points()[0].value, RawValue::Text("10".to_string()));
        assert_eq!(series.points()[1].value, RawValue::Number(9.0));
    }

    #[test]
    fn test_column_arrays_shape() {
        let raw = json!({"Month": ["Jan", "Feb"], "Value": [1.5, 2.5]});
        let table = DataTable::from_json(&raw).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_shapes_build_empty_tables() {
        for raw in [json!(null), json!({}), json!([])] {
            assert!(DataTable::from_json(&raw).unwrap().is_empty());
        }
    }

    #[test]
    fn test_rejects_scalars_and_ragged_columns() {
        assert_eq!(
            DataTable::from_json(&json!("1,2,3")),
            Err(TableError::UnsupportedShape("string"))
        );
        assert!(matches!(
            DataTable::from_json(&json!({"Date": ["a"], "Value": [1, 2]})),
            Err(TableError::RaggedColumn { .. })
        ));
        assert_eq!(
            DataTable::from_json(&json!([1, 2])),
            Err(TableError::NotARecord { row: 0 })
        );
    }

    #[test]
    fn test_missing_value_column() {
        let table = DataTable::from_json(&json!({"Date": ["a"], "Amount": [1]})).unwrap();
        assert_eq!(
            table.value_series("Value", None),
            Err(TableError::MissingColumn("Value".to_string()))
        );
    }

    #[test]
    fn test_columns_keep_client_order() {
        let table = DataTable::from_json(&json!({
            "Value": [1, 2],
            "Month": ["Jan", "Feb"],
            "Amount": [5, 6]
        }))
        .unwrap();

        let series = table.value_series("Value", None).unwrap();
        assert_eq!(series.points()[0].label, "Jan");
        assert_eq!(
            table.to_compact_json(),
            r#"[{"Value":1,"Month":"Jan","Amount":5},{"Value":2,"Month":"Feb","Amount":6}]"#
        );
    }

    #[test]
    fn test_labels_fall_back_to_row_index() {
        let table = DataTable::from_json(&json!({"Value": [3, 4]})).unwrap();
        let series = table.value_series("Value", None).unwrap();
        assert_eq!(series.points()[1].label, "1");
    }

    #[test]
    fn test_compact_json_is_single_line_records() {
        let table = DataTable::from_json(&json!({
            "Date": {"0": "2020-01-07", "1": "2020-01-08"},
            "Value": {"0": 5, "1": 6}
        }))
        .unwrap();
        assert_eq!(
            table.to_compact_json(),
            r#"[{"Date":"2020-01-07","Value":5},{"Date":"2020-01-08","Value":6}]"#
        );
    }
}
