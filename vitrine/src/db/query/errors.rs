// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

/// Validation errors for list queries.
///
/// All of these are detected before the database is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Ordering is based on a field which is not part of the collection.
    #[error("Can't apply ordering on unknown field '{0}'")]
    OrderFieldUnknown(String),

    /// Ordering is based on a field which is not in the sort allow-list.
    #[error("Can't apply ordering on field '{0}' as it is not sortable")]
    OrderFieldNotSortable(String),

    /// Sort direction is neither "asc" nor "desc".
    #[error("Unknown sort direction '{0}', expected 'asc' or 'desc'")]
    DirectionUnknown(String),

    /// Page size is zero, negative or exceeds the configured maximum.
    #[error("Page size {0} is out of range, expected a value between 1 and {1}")]
    LimitOutOfRange(i64, u64),

    /// Cursor points at a row which does not exist (anymore) in the queried scope.
    #[error("Stale cursor {0}, the row does not exist in this collection")]
    CursorStale(i64),

    /// Filter contains a field which is not part of the collection.
    #[error("Can't apply filter on unknown field '{0}'")]
    FilterFieldUnknown(String),

    /// Filter can not be applied to a field of given type.
    #[error("Filter type '{0}' for field '{1}' is not matching column type '{2}'")]
    FilterInvalidType(String, String, String),

    /// Set filters are not possible for boolean values.
    #[error("Can't apply set filter as field '{0}' is of type boolean")]
    FilterInvalidSet(String),

    /// Interval filters are not possible for booleans.
    #[error("Can't apply interval filter as field '{0}' is not of type string, float or integer")]
    FilterInvalidInterval(String),

    /// Search filters can only be applied on strings.
    #[error("Can't apply search filter as field '{0}' is not of type string")]
    FilterInvalidSearch(String),
}
