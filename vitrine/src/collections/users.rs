// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::query::{Column, ColumnType, Filter, Value};
use crate::db::traits::{Collection, IntoFilter, WriteFields};
use crate::mutation::Role;

/// Registered accounts of the application, only listed for admins as rows contain email
/// addresses.
#[derive(Debug, Clone, Copy)]
pub struct User;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserFilter {
    /// Only list users with one of these roles.
    pub roles: Vec<Role>,

    /// Only list users whose name contains this string.
    pub search: Option<String>,
}

impl IntoFilter for UserFilter {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::new();

        if !self.roles.is_empty() {
            let roles: Vec<Value> = self.roles.iter().map(|role| role.as_str().into()).collect();
            filter.add_in("role", &roles);
        }

        if let Some(search) = self.search {
            filter.add_contains("name", &search);
        }

        filter
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFields {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl WriteFields for UserFields {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name can't be empty".into());
        }

        if !self.email.contains('@') {
            return Err(format!("'{}' is not a valid email address", self.email));
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.as_str().into()),
            ("email", self.email.as_str().into()),
            ("role", self.role.as_str().into()),
        ]
    }
}

impl Collection for User {
    const NAME: &'static str = "users";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::sortable("name", ColumnType::String),
        Column::new("email", ColumnType::String),
        Column::new("role", ColumnType::String),
        Column::sortable("created_at", ColumnType::String),
    ];
    const DEFAULT_SORT: &'static str = "created_at";
    const RESTRICTED: bool = true;

    type Row = UserRow;
    type Filter = UserFilter;
    type Fields = UserFields;
}
