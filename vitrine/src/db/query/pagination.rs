// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Display;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::db::query::errors::QueryError;

/// Number of rows returned per page when the client did not ask for a specific page size.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Upper bound of the page size when nothing else was configured.
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// Cursor aiding pagination, holding the primary key of the first row of the next page.
///
/// On the wire this is a plain integer. Clients should not read any further meaning into it and
/// only ever pass back what they received as `nextCur`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowCursor(i64);

impl RowCursor {
    /// Returns a cursor pointing at the row with this primary key.
    pub fn new(row_id: i64) -> Self {
        Self(row_id)
    }

    /// Returns the primary key of the row this cursor points at.
    pub fn row_id(&self) -> i64 {
        self.0
    }
}

impl Display for RowCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RowCursor {
    fn from(row_id: i64) -> Self {
        Self(row_id)
    }
}

/// Pagination settings which can be used further to construct a database query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// Number of rows which should be returned at most.
    pub first: NonZeroU64,

    /// Resume the listing at the row this cursor points at.
    pub after: Option<RowCursor>,
}

impl Pagination {
    pub fn new(first: NonZeroU64, after: Option<&RowCursor>) -> Self {
        Self {
            first,
            after: after.copied(),
        }
    }

    /// Returns pagination settings from untrusted client values.
    ///
    /// An absent limit falls back to the default page size, limits smaller than 1 or larger than
    /// `max_page_size` are rejected.
    pub fn from_request(
        limit: Option<i64>,
        cursor: Option<RowCursor>,
        max_page_size: u64,
    ) -> Result<Self, QueryError> {
        let first = match limit {
            None => DEFAULT_PAGE_SIZE.min(max_page_size),
            Some(limit) if limit < 1 || limit as u64 > max_page_size => {
                return Err(QueryError::LimitOutOfRange(limit, max_page_size));
            }
            Some(limit) => limit as u64,
        };

        let first =
            NonZeroU64::new(first).ok_or(QueryError::LimitOutOfRange(0, max_page_size))?;

        Ok(Self {
            first,
            after: cursor,
        })
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            // Unwrap here because we know that the default is non-zero
            first: NonZeroU64::new(DEFAULT_PAGE_SIZE).unwrap(),
            after: None,
        }
    }
}

/// One page of results together with the cursor of the following page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows of this page, in the order of the query.
    pub items: Vec<T>,

    /// Cursor to fetch the next page with, absent when this was the last page.
    #[serde(rename = "nextCur")]
    pub next_cursor: Option<RowCursor>,
}

impl<T> Page<T> {
    /// Returns an empty last page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    /// Returns true if another page can be fetched after this one.
    pub fn has_next_page(&self) -> bool {
        self.next_cursor.is_some()
    }
}
