// SPDX-License-Identifier: AGPL-3.0-or-later

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::db::query::errors::QueryError;

/// Options to determine the direction of the ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Arrange items from smallest to largest value.
    #[serde(rename = "asc")]
    Ascending,

    /// Arrange items from largest to smallest value.
    #[serde(rename = "desc")]
    Descending,
}

impl Direction {
    /// Returns the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }

    /// Returns the SQL comparison operator selecting rows which come "later" in this direction.
    pub fn cmp_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => ">",
            Direction::Descending => "<",
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Descending
    }
}

impl FromStr for Direction {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Direction::Ascending),
            "desc" => Ok(Direction::Descending),
            _ => Err(QueryError::DirectionUnknown(value.to_string())),
        }
    }
}

/// Ordering settings which can be used further to construct a database query.
///
/// An ordering determines in which direction and based on what field the results are sorted. The
/// primary key is always appended as an ascending tie-breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub direction: Direction,
}

impl Order {
    /// Returns a new instance of ordering settings.
    pub fn new(field: &str, direction: &Direction) -> Self {
        Self {
            field: field.to_string(),
            direction: *direction,
        }
    }
}
