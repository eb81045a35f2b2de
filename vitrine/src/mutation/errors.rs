// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db::errors::StorageError;

/// Categories of failed operations, as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InternalServerError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors of operations performed on behalf of an actor.
#[derive(thiserror::Error, Debug)]
pub enum MutationError {
    #[error("Invalid actor context: {0}")]
    InvalidActor(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not allowed to modify {0}")]
    Forbidden(String),

    #[error("Row {1} not found in {0}")]
    NotFound(&'static str, i64),

    #[error("Invalid fields: {0}")]
    InvalidFields(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MutationError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MutationError::InvalidActor(_) => ErrorKind::BadRequest,
            MutationError::Unauthenticated => ErrorKind::Unauthorized,
            MutationError::Forbidden(_) => ErrorKind::Forbidden,
            MutationError::NotFound(_, _) => ErrorKind::NotFound,
            MutationError::InvalidFields(_) => ErrorKind::BadRequest,
            MutationError::Storage(StorageError::Validation(_)) => ErrorKind::BadRequest,
            MutationError::Storage(StorageError::FatalStorageError(_)) => {
                ErrorKind::InternalServerError
            }
        }
    }
}
