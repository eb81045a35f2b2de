// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::query::{Column, ColumnType, Filter, Value};
use crate::db::traits::{Collection, IntoFilter, WriteFields};

/// Blog articles, grouped in categories.
#[derive(Debug, Clone, Copy)]
pub struct Article;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category_id: i64,
    pub author_id: Option<i64>,
    pub published: bool,
    pub views: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticleFilter {
    /// Only list articles in one of these categories.
    pub category_ids: Vec<i64>,

    pub author_id: Option<i64>,

    pub published: Option<bool>,

    /// Only list articles whose title contains this string.
    pub search: Option<String>,
}

impl IntoFilter for ArticleFilter {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::new();

        if !self.category_ids.is_empty() {
            let ids: Vec<Value> = self.category_ids.into_iter().map(Value::from).collect();
            filter.add_in("category_id", &ids);
        }

        if let Some(author_id) = self.author_id {
            filter.add("author_id", &author_id.into());
        }

        if let Some(published) = self.published {
            filter.add("published", &published.into());
        }

        if let Some(search) = self.search {
            filter.add_contains("title", &search);
        }

        filter
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFields {
    pub title: String,
    pub body: String,
    pub category_id: i64,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub views: i64,
}

impl WriteFields for ArticleFields {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title can't be empty".into());
        }

        if self.views < 0 {
            return Err("Views can't be negative".into());
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("title", self.title.as_str().into()),
            ("body", self.body.as_str().into()),
            ("category_id", self.category_id.into()),
            ("author_id", self.author_id.into()),
            ("published", self.published.into()),
            ("views", self.views.into()),
        ]
    }
}

impl Collection for Article {
    const NAME: &'static str = "articles";
    const TABLE: &'static str = "articles";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::sortable("title", ColumnType::String),
        Column::new("body", ColumnType::String),
        Column::new("category_id", ColumnType::Integer),
        Column::new("author_id", ColumnType::Integer),
        Column::new("published", ColumnType::Boolean),
        Column::sortable("views", ColumnType::Integer),
        Column::sortable("created_at", ColumnType::String),
    ];
    const DEFAULT_SORT: &'static str = "created_at";

    type Row = ArticleRow;
    type Filter = ArticleFilter;
    type Fields = ArticleFields;
}
