//! Tabular classification of fetched output arrays

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use workbench_core::{OutputDataType, OutputItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableColumn {
    pub name: String,
    /// Set by the first array- or object-shaped cell seen in the column
    pub sub_type: Option<OutputDataType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<Value>>,
}

/// The data type that decides how an output array is rendered.
///
/// This is the least frequent type in the array; ties go to the type seen
/// first.
pub fn type_mode(items: &[OutputItem]) -> Option<OutputDataType> {
    let mut counts: IndexMap<OutputDataType, usize> = IndexMap::new();
    for item in items {
        *counts.entry(item.data_type).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .min_by_key(|(_, count)| *count)
        .map(|(data_type, _)| data_type)
}

/// Build a table from the iterable items of `items`, one row per item.
///
/// Columns are the keys of the first object-shaped row, or positional
/// indices when rows are arrays. String cells holding JSON are decoded.
pub fn build_table(items: &[OutputItem]) -> Option<Table> {
    let rows: Vec<&Value> = items
        .iter()
        .filter(|item| item.data_type == OutputDataType::Iterable)
        .map(|item| &item.data)
        .collect();
    if rows.is_empty() {
        return None;
    }

    let keys = infer_columns(&rows);
    let mut columns: Vec<TableColumn> = keys
        .iter()
        .map(|key| TableColumn {
            name: key.label(),
            sub_type: None,
        })
        .collect();

    let rows = rows
        .into_iter()
        .map(|row| {
            keys.iter()
                .zip(columns.iter_mut())
                .map(|(key, column)| {
                    let cell = decode_cell(key.cell(row));
                    if column.sub_type.is_none() {
                        column.sub_type = match &cell {
                            Value::Array(_) => Some(OutputDataType::Iterable),
                            Value::Object(_) => Some(OutputDataType::DictionaryComplex),
                            _ => None,
                        };
                    }
                    cell
                })
                .collect()
        })
        .collect();

    Some(Table { columns, rows })
}

enum ColumnKey {
    Field(String),
    Index(usize),
}

impl ColumnKey {
    fn label(&self) -> String {
        match self {
            ColumnKey::Field(name) => name.clone(),
            ColumnKey::Index(index) => index.to_string(),
        }
    }

    fn cell(&self, row: &Value) -> Value {
        let cell = match (self, row) {
            (ColumnKey::Field(name), Value::Object(fields)) => fields.get(name),
            (ColumnKey::Index(index), Value::Array(values)) => values.get(*index),
            (ColumnKey::Index(0), scalar) if !scalar.is_object() => Some(scalar),
            _ => None,
        };
        cell.cloned().unwrap_or(Value::Null)
    }
}

fn infer_columns(rows: &[&Value]) -> Vec<ColumnKey> {
    if let Some(fields) = rows.iter().find_map(|row| row.as_object()) {
        return fields.keys().cloned().map(ColumnKey::Field).collect();
    }
    let width = rows
        .iter()
        .map(|row| row.as_array().map_or(1, Vec::len))
        .max()
        .unwrap_or(0);
    (0..width).map(ColumnKey::Index).collect()
}

fn decode_cell(cell: Value) -> Value {
    match cell {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}
