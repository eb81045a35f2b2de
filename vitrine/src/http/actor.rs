// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use http::HeaderMap;

use crate::http::errors::ApiError;
use crate::mutation::{ActorContext, MutationError, Role};

/// Header carrying the id of the authenticated user.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Header carrying the comma-separated roles of the authenticated user.
pub const ACTOR_ROLES_HEADER: &str = "x-actor-roles";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, MutationError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| MutationError::InvalidActor(format!("{name} is not valid text")))
        })
        .transpose()
}

/// Reads the actor context from the request headers set by the authentication layer.
///
/// Requests without these headers are anonymous.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<ActorContext, MutationError> {
    let user_id = header_str(headers, ACTOR_ID_HEADER)?
        .map(|value| {
            value.trim().parse::<i64>().map_err(|_| {
                MutationError::InvalidActor(format!("'{value}' is not a valid user id"))
            })
        })
        .transpose()?;

    let roles = match header_str(headers, ACTOR_ROLES_HEADER)? {
        Some(value) => value
            .split(',')
            .filter(|role| !role.trim().is_empty())
            .map(|role| role.parse::<Role>())
            .collect::<Result<Vec<Role>, MutationError>>()?,
        None => Vec::new(),
    };

    Ok(ActorContext { user_id, roles })
}

#[async_trait]
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(actor_from_headers(&parts.headers)?)
    }
}
