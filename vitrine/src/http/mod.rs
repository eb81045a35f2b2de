// SPDX-License-Identifier: AGPL-3.0-or-later

mod actor;
mod api;
mod context;
mod errors;
mod service;

pub use actor::{actor_from_headers, ACTOR_ID_HEADER, ACTOR_ROLES_HEADER};
pub use api::{DeleteRequest, ListRequest, UpsertRequest};
pub use context::HttpServiceContext;
pub use errors::{ApiError, ErrorBody};
pub use service::{build_server, http_service};
