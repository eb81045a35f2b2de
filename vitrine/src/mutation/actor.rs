// SPDX-License-Identifier: AGPL-3.0-or-later

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::db::query::Filter;
use crate::db::traits::Collection;
use crate::mutation::errors::MutationError;

/// Capabilities a user can have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages all content of the application.
    Admin,

    /// Requests services and keeps a portfolio.
    #[default]
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }
}

impl FromStr for Role {
    type Err = MutationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "client" => Ok(Role::Client),
            _ => Err(MutationError::InvalidActor(format!("unknown role '{value}'"))),
        }
    }
}

/// Identity and capabilities of whoever performs an operation.
///
/// The context is always passed in explicitly, it is established by an authentication layer in
/// front of this service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorContext {
    /// Id of the authenticated user, `None` for anonymous actors.
    pub user_id: Option<i64>,

    pub roles: Vec<Role>,
}

impl ActorContext {
    pub fn new(user_id: i64, roles: &[Role]) -> Self {
        Self {
            user_id: Some(user_id),
            roles: roles.to_vec(),
        }
    }

    /// Returns a context without identity or roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Returns true if this actor is authenticated and has the admin role.
    pub fn is_admin(&self) -> bool {
        self.user_id.is_some() && self.roles.contains(&Role::Admin)
    }

    /// Returns the id of the authenticated user or fails for anonymous actors.
    pub fn require_user(&self) -> Result<i64, MutationError> {
        self.user_id.ok_or(MutationError::Unauthenticated)
    }

    /// Returns the filter restricting list queries on a collection to what this actor may see.
    ///
    /// Rows of collections with an owner are only visible to their owner, admins see everything.
    /// Restricted collections can't be listed by anybody but admins.
    pub fn list_scope<C: Collection>(&self) -> Result<Option<Filter>, MutationError> {
        if C::RESTRICTED && !self.is_admin() {
            self.require_user()?;
            return Err(MutationError::Forbidden(format!("listing {}", C::NAME)));
        }

        let owner_column = match C::OWNER_COLUMN {
            Some(column) if !self.is_admin() => column,
            _ => return Ok(None),
        };

        let user_id = self.require_user()?;

        let mut scope = Filter::new();
        scope.add(owner_column, &user_id.into());
        Ok(Some(scope))
    }
}
