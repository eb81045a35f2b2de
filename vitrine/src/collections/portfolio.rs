// SPDX-License-Identifier: AGPL-3.0-or-later

//! Profile entries users keep about themselves: work experience, skills and projects.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::query::{Column, ColumnType, Filter, Value};
use crate::db::traits::{Collection, IntoFilter, WriteFields};

/// Highest level a skill can be rated with.
pub const MAX_SKILL_LEVEL: i64 = 5;

#[derive(Debug, Clone, Copy)]
pub struct Experience;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceRow {
    pub id: i64,
    pub user_id: i64,
    pub company: String,
    pub position: String,
    pub description: String,
    pub started_at: String,
    pub ended_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperienceFilter {
    pub user_id: Option<i64>,

    /// Only list experiences at companies containing this string.
    pub company: Option<String>,
}

impl IntoFilter for ExperienceFilter {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::new();

        if let Some(user_id) = self.user_id {
            filter.add("user_id", &user_id.into());
        }

        if let Some(company) = self.company {
            filter.add_contains("company", &company);
        }

        filter
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceFields {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub description: String,
    pub started_at: String,
    #[serde(default)]
    pub ended_at: Option<String>,
}

impl WriteFields for ExperienceFields {
    fn validate(&self) -> Result<(), String> {
        if self.company.trim().is_empty() {
            return Err("Company can't be empty".into());
        }

        if self.started_at.trim().is_empty() {
            return Err("Start date can't be empty".into());
        }

        // Dates are ISO 8601 strings and compare lexicographically
        if let Some(ended_at) = &self.ended_at {
            if ended_at < &self.started_at {
                return Err("Experience can't end before it started".into());
            }
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("company", self.company.as_str().into()),
            ("position", self.position.as_str().into()),
            ("description", self.description.as_str().into()),
            ("started_at", self.started_at.as_str().into()),
            ("ended_at", self.ended_at.clone().into()),
        ]
    }
}

impl Collection for Experience {
    const NAME: &'static str = "experiences";
    const TABLE: &'static str = "experiences";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::new("user_id", ColumnType::Integer),
        Column::new("company", ColumnType::String),
        Column::new("position", ColumnType::String),
        Column::new("description", ColumnType::String),
        Column::sortable("started_at", ColumnType::String),
        Column::new("ended_at", ColumnType::String),
    ];
    const DEFAULT_SORT: &'static str = "started_at";
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");

    type Row = ExperienceRow;
    type Filter = ExperienceFilter;
    type Fields = ExperienceFields;
}

#[derive(Debug, Clone, Copy)]
pub struct Skill;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SkillRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub level: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillFilter {
    pub user_id: Option<i64>,
    pub min_level: Option<i64>,
}

impl IntoFilter for SkillFilter {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::new();

        if let Some(user_id) = self.user_id {
            filter.add("user_id", &user_id.into());
        }

        if let Some(min_level) = self.min_level {
            filter.add_gte("level", &min_level.into());
        }

        filter
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillFields {
    pub name: String,
    pub level: i64,
}

impl WriteFields for SkillFields {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name can't be empty".into());
        }

        if !(1..=MAX_SKILL_LEVEL).contains(&self.level) {
            return Err(format!(
                "Level needs to be between 1 and {MAX_SKILL_LEVEL}, got {}",
                self.level
            ));
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", self.name.as_str().into()),
            ("level", self.level.into()),
        ]
    }
}

impl Collection for Skill {
    const NAME: &'static str = "skills";
    const TABLE: &'static str = "skills";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::new("user_id", ColumnType::Integer),
        Column::sortable("name", ColumnType::String),
        Column::sortable("level", ColumnType::Integer),
    ];
    const DEFAULT_SORT: &'static str = "level";
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");

    type Row = SkillRow;
    type Filter = SkillFilter;
    type Fields = SkillFields;
}

#[derive(Debug, Clone, Copy)]
pub struct Project;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectFilter {
    pub user_id: Option<i64>,
    pub search: Option<String>,
}

impl IntoFilter for ProjectFilter {
    fn into_filter(self) -> Filter {
        let mut filter = Filter::new();

        if let Some(user_id) = self.user_id {
            filter.add("user_id", &user_id.into());
        }

        if let Some(search) = self.search {
            filter.add_contains("title", &search);
        }

        filter
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl WriteFields for ProjectFields {
    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title can't be empty".into());
        }

        Ok(())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("title", self.title.as_str().into()),
            ("description", self.description.as_str().into()),
            ("url", self.url.clone().into()),
        ]
    }
}

impl Collection for Project {
    const NAME: &'static str = "projects";
    const TABLE: &'static str = "projects";
    const COLUMNS: &'static [Column] = &[
        Column::sortable("id", ColumnType::Integer),
        Column::new("user_id", ColumnType::Integer),
        Column::sortable("title", ColumnType::String),
        Column::new("description", ColumnType::String),
        Column::new("url", ColumnType::String),
        Column::sortable("created_at", ColumnType::String),
    ];
    const DEFAULT_SORT: &'static str = "created_at";
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");

    type Row = ProjectRow;
    type Filter = ProjectFilter;
    type Fields = ProjectFields;
}
