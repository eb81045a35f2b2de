// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::query::{Column, ColumnType, Filter, Value};
use crate::db::traits::{Collection, IntoFilter, WriteFields};

/// Catalog of services clients can request.
#[derive(Debug, Clone, Copy)]
pub struct Service;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category_id: i64,
    pub price: f64,
    pub purchases: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceFilter {
    pub category_ids: Vec<i64>,

    /// Lowest price, inclusive.
    pub min_price: Option<f64>,

    /// Highest price, inclusive.
    pub max_price: Option<f64>,

    pub search: Option<String>,
}

impl IntoFilter for ServiceFilter {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::new();

        if !self.category_ids.is_empty() {
            let ids: Vec<Value> = self.category_ids.into_iter().map(Value::from).collect();
            filter.add_in("category_id", &ids);
        }

        if let Some(min_price) = self.min_price {
            filter.add_gte("price", &min_price.into());
        }

        if let Some(max_price) = self.max_price {
            filter.add_lte("price", &max_price.into());
        }

        if let Some(search) = self.search {
            filter.add_contains("name", &search);
        }

        filter
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: i64,
    pub price: f64,
    #[serde(default)]
    pub purchases: i64,
}

impl WriteFields for ServiceFields {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name can't be empty".into());
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("Invalid price {}", self.price));
        }

        if self.purchases < 0 {
            return Err("Purchases can't be negative".into());
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.as_str().into()),
            ("description", self.description.as_str().into()),
            ("category_id", self.category_id.into()),
            ("price", self.price.into()),
            ("purchases", self.purchases.into()),
        ]
    }
}

impl Collection for Service {
    const NAME: &'static str = "services";
    const TABLE: &'static str = "services";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::sortable("name", ColumnType::String),
        Column::new("description", ColumnType::String),
        Column::new("category_id", ColumnType::Integer),
        Column::sortable("price", ColumnType::Float),
        Column::sortable("purchases", ColumnType::Integer),
        Column::sortable("created_at", ColumnType::String),
    ];
    const DEFAULT_SORT: &'static str = "created_at";

    type Row = ServiceRow;
    type Filter = ServiceFilter;
    type Fields = ServiceFields;
}
