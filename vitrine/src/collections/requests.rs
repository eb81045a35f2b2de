// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::query::{Column, ColumnType, Filter, Value};
use crate::db::traits::{Collection, IntoFilter, WriteFields};

/// Requests for services, owned by the client who sent them.
#[derive(Debug, Clone, Copy)]
pub struct Request;

/// Processing state of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    New,
    InProgress,
    Done,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Done => "done",
            RequestStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RequestRow {
    pub id: i64,
    pub user_id: i64,
    pub service_id: i64,
    pub status: String,
    pub message: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestFilter {
    /// Only list requests of this user.
    pub user_id: Option<i64>,

    pub service_id: Option<i64>,

    /// Only list requests in one of these states.
    pub statuses: Vec<RequestStatus>,

    /// Hide requests in any of these states.
    pub exclude_statuses: Vec<RequestStatus>,
}

impl IntoFilter for RequestFilter {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::new();

        if let Some(user_id) = self.user_id {
            filter.add("user_id", &user_id.into());
        }

        if let Some(service_id) = self.service_id {
            filter.add("service_id", &service_id.into());
        }

        if !self.statuses.is_empty() {
            let statuses: Vec<Value> = self
                .statuses
                .iter()
                .map(|status| status.as_str().into())
                .collect();
            filter.add_in("status", &statuses);
        }

        if !self.exclude_statuses.is_empty() {
            let statuses: Vec<Value> = self
                .exclude_statuses
                .iter()
                .map(|status| status.as_str().into())
                .collect();
            filter.add_not_in("status", &statuses);
        }

        filter
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFields {
    pub service_id: i64,
    /// Only admins can change the state, requests of clients always start as new.
    #[serde(default)]
    pub status: RequestStatus,
    pub message: String,
}

impl WriteFields for RequestFields {
    fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("Message can't be empty".into());
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("service_id", self.service_id.into()),
            ("status", self.status.as_str().into()),
            ("message", self.message.as_str().into()),
        ]
    }
}

impl Collection for Request {
    const NAME: &'static str = "requests";
    const TABLE: &'static str = "requests";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::new("user_id", ColumnType::Integer),
        Column::new("service_id", ColumnType::Integer),
        Column::sortable("status", ColumnType::String),
        Column::new("message", ColumnType::String),
        Column::sortable("created_at", ColumnType::String),
    ];
    const DEFAULT_SORT: &'static str = "created_at";
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");
    const ADMIN_COLUMNS: &'static [&'static str] = &["status"];

    type Row = RequestRow;
    type Filter = RequestFilter;
    type Fields = RequestFields;
}
