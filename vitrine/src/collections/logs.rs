// SPDX-License-Identifier: AGPL-3.0-or-later

//! Changelogs: commits imported from repositories and hand-written release notes.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::query::{Column, ColumnType, Filter, Value};
use crate::db::traits::{Collection, IntoFilter, WriteFields};

#[derive(Debug, Clone, Copy)]
pub struct GitLog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GitLogRow {
    pub id: i64,
    pub repository: String,
    pub hash: String,
    pub message: String,
    pub author: String,
    pub committed_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GitLogFilter {
    pub repository: Option<String>,
}

impl IntoFilter for GitLogFilter {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::new();

        if let Some(repository) = self.repository {
            filter.add("repository", &repository.into());
        }

        filter
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitLogFields {
    pub repository: String,
    pub hash: String,
    pub message: String,
    pub author: String,
    pub committed_at: String,
}

impl WriteFields for GitLogFields {
    fn validate(&self) -> Result<(), String> {
        if self.repository.trim().is_empty() {
            return Err("Repository can't be empty".into());
        }

        if self.hash.is_empty() || !self.hash.chars().all(|char| char.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a commit hash", self.hash));
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("repository", self.repository.as_str().into()),
            ("hash", self.hash.as_str().into()),
            ("message", self.message.as_str().into()),
            ("author", self.author.as_str().into()),
            ("committed_at", self.committed_at.as_str().into()),
        ]
    }
}

impl Collection for GitLog {
    const NAME: &'static str = "git_logs";
    const TABLE: &'static str = "git_logs";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::new("repository", ColumnType::String),
        Column::new("hash", ColumnType::String),
        Column::new("message", ColumnType::String),
        Column::new("author", ColumnType::String),
        Column::sortable("committed_at", ColumnType::String),
    ];
    const DEFAULT_SORT: &'static str = "committed_at";

    type Row = GitLogRow;
    type Filter = GitLogFilter;
    type Fields = GitLogFields;
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateLog;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogRow {
    pub id: i64,
    pub version: String,
    pub notes: String,
    pub released_at: String,
}

/// Release notes can't be filtered.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLogFilter {}

impl IntoFilter for UpdateLogFilter {
    fn into_filter(self) -> Filter {
        Filter::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogFields {
    pub version: String,
    pub notes: String,

    /// Release date, defaults to the time of creation.
    #[serde(default)]
    pub released_at: Option<String>,
}

impl WriteFields for UpdateLogFields {
    fn validate(&self) -> Result<(), String> {
        if self.version.trim().is_empty() {
            return Err("Version can't be empty".into());
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        let mut values = vec![
            ("version", self.version.as_str().into()),
            ("notes", self.notes.as_str().into()),
        ];

        if let Some(released_at) = &self.released_at {
            values.push(("released_at", released_at.as_str().into()));
        }

        values
    }
}

impl Collection for UpdateLog {
    const NAME: &'static str = "update_logs";
    const TABLE: &'static str = "update_logs";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::sortable("version", ColumnType::String),
        Column::new("notes", ColumnType::String),
        Column::sortable("released_at", ColumnType::String),
    ];
    const DEFAULT_SORT: &'static str = "released_at";

    type Row = UpdateLogRow;
    type Filter = UpdateLogFilter;
    type Fields = UpdateLogFields;
}
