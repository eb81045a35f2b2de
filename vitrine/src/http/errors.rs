// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::db::errors::StorageError;
use crate::db::query::errors::QueryError;
use crate::mutation::{ErrorKind, MutationError};

/// Body of every failed RPC response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorKind,
    pub message: String,
}

/// Error returned by RPC handlers, rendered as `{ code, message }` with a matching status.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MutationError> for ApiError {
    fn from(err: MutationError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        MutationError::from(err).into()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::new(ErrorKind::BadRequest, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(err: JsonRejection) -> Self {
        Self::new(ErrorKind::BadRequest, err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Details of internal errors stay in the logs
        let message = if self.kind == ErrorKind::InternalServerError {
            error!("{}", self.message);
            "Internal server error".to_string()
        } else {
            warn!("Rejected request: {}", self.message);
            self.message
        };

        let body = ErrorBody {
            code: self.kind,
            message,
        };

        (status, Json(body)).into_response()
    }
}
