// SPDX-License-Identifier: AGPL-3.0-or-later

//! All paginated collections of the application.
//!
//! Each collection is a plain description of its table: the columns and which of them can be
//! ordered by, the filters clients can use and the fields they can write.
mod articles;
mod logs;
mod portfolio;
mod requests;
mod services;
mod users;

pub use articles::{Article, ArticleFields, ArticleFilter, ArticleRow};
pub use logs::{
    GitLog, GitLogFields, GitLogFilter, GitLogRow, UpdateLog, UpdateLogFields, UpdateLogFilter,
    UpdateLogRow,
};
pub use portfolio::{
    Experience, ExperienceFields, ExperienceFilter, ExperienceRow, Project, ProjectFields,
    ProjectFilter, ProjectRow, Skill, SkillFields, SkillFilter, SkillRow, MAX_SKILL_LEVEL,
};
pub use requests::{Request, RequestFields, RequestFilter, RequestRow, RequestStatus};
pub use services::{Service, ServiceFields, ServiceFilter, ServiceRow};
pub use users::{User, UserFields, UserFilter, UserRow};

use crate::db::traits::Identifiable;

macro_rules! identifiable {
    ($($row:ty),*) => {
        $(
            impl Identifiable for $row {
                fn id(&self) -> i64 {
                    self.id
                }
            }
        )*
    };
}

identifiable!(
    UserRow,
    ArticleRow,
    ServiceRow,
    RequestRow,
    ExperienceRow,
    SkillRow,
    ProjectRow,
    GitLogRow,
    UpdateLogRow
);
