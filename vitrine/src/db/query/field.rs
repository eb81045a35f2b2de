// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Name of the primary key column every collection table carries.
pub const PRIMARY_KEY: &str = "id";

/// Storage types of columns which can be filtered or ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnType::Integer => "int",
            ColumnType::Float => "float",
            ColumnType::String => "str",
            ColumnType::Boolean => "bool",
        };

        write!(f, "{name}")
    }
}

/// Static description of a table column.
///
/// Column names are the only identifiers which ever get written into SQL strings, everything
/// coming from a client is bound as an argument instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Name of the column in the database table.
    pub name: &'static str,

    /// Type of the values stored in this column.
    pub column_type: ColumnType,

    /// Flag indicating if clients are allowed to order results by this column.
    pub sortable: bool,
}

impl Column {
    /// Returns a column which can be filtered but not ordered by.
    pub const fn new(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            sortable: false,
        }
    }

    /// Returns a column which is part of the sort allow-list.
    pub const fn sortable(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            sortable: true,
        }
    }
}

/// Untrusted value used in filters and writes.
///
/// Values are always bound as arguments to SQL queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Returns the column type this value can be compared with, `None` for nulls.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(ColumnType::Boolean),
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Float(_) => Some(ColumnType::Float),
            Value::String(_) => Some(ColumnType::String),
        }
    }

    /// Returns true if this value can be stored in or compared against a column of the given
    /// type.
    ///
    /// Integers are accepted for float columns as well. Nulls never match, they can be written
    /// but not filtered by.
    pub fn matches(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Value::Boolean(_), ColumnType::Boolean)
                | (Value::Integer(_), ColumnType::Integer)
                | (Value::Integer(_), ColumnType::Float)
                | (Value::Float(_), ColumnType::Float)
                | (Value::String(_), ColumnType::String)
        )
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Returns the column with the given name from a list of columns.
pub fn find_column<'a>(columns: &'a [Column], name: &str) -> Option<&'a Column> {
    columns.iter().find(|column| column.name == name)
}
