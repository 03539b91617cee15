use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Column types understood by the charting front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    Text,
    Date,
    DateTime,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "number",
            Self::Text => "text",
            Self::Date => "date",
            Self::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Text(String),
    Null,
}

impl Value {
    /// `None` for [`Value::Null`], which fits any column.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Number(_) => Some(ValueType::Number),
            Self::DateTime(_) => Some(ValueType::DateTime),
            Self::Date(_) => Some(ValueType::Date),
            Self::Text(_) => Some(ValueType::Text),
            Self::Null => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDescription {
    pub id: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub label: String,
}

impl ColumnDescription {
    pub fn new(id: impl Into<String>, value_type: ValueType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value_type,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCell {
    #[serde(rename = "v")]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    #[serde(rename = "c")]
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().map(|cell| &cell.value)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("column {column} expects {expected} but got {found}")]
    TypeMismatch {
        column: String,
        expected: ValueType,
        found: ValueType,
    },
    #[error("row has {found} cells but the table has {expected} columns")]
    CellCount { expected: usize, found: usize },
}

/// Column descriptions plus rows of values, serialized as `{cols, rows}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataTable {
    #[serde(rename = "cols")]
    columns: Vec<ColumnDescription>,
    rows: Vec<TableRow>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, column: ColumnDescription) {
        self.columns.push(column);
    }

    pub fn add_columns(&mut self, columns: impl IntoIterator<Item = ColumnDescription>) {
        self.columns.extend(columns);
    }

    /// Appends a row after checking it against the column descriptions.
    pub fn add_row(&mut self, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError::CellCount {
                expected: self.columns.len(),
                found: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(&values) {
            if let Some(found) = value.value_type()
                && found != column.value_type
            {
                return Err(TableError::TypeMismatch {
                    column: column.id.clone(),
                    expected: column.value_type,
                    found,
                });
            }
        }
        self.rows.push(TableRow {
            cells: values.into_iter().map(|value| TableCell { value }).collect(),
        });
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnDescription] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }
}
