// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::db::query::errors::QueryError;

/// Errors returned by list and write queries against the database.
#[derive(thiserror::Error, Debug, Clone)]
pub enum StorageError {
    /// Query was rejected before it reached the database.
    #[error(transparent)]
    Validation(#[from] QueryError),

    /// Error returned from the database.
    #[error("Fatal storage error: {0}")]
    FatalStorageError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::FatalStorageError(err.to_string())
    }
}
