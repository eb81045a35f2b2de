// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::Extension;
use axum::Json;
use log::debug;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::db::query::errors::QueryError;
use crate::db::query::{Direction, Order, Page, Pagination, RowCursor};
use crate::db::stores::Query;
use crate::db::traits::{Collection, IntoFilter};
use crate::http::context::HttpServiceContext;
use crate::http::errors::ApiError;
use crate::mutation::{self, ActorContext, ErrorKind, Upsert};

/// Parameters of a list request, followed by the collection-specific filters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest<F> {
    pub limit: Option<i64>,
    pub cursor: Option<RowCursor>,
    pub sort: Option<String>,
    pub sort_dir: Option<String>,
    #[serde(flatten)]
    pub filter: F,
    /// Keys neither known to the request nor to the filter.
    #[serde(flatten)]
    pub unknown: BTreeMap<String, IgnoredAny>,
}

impl<F: IntoFilter> ListRequest<F> {
    /// Converts the untrusted request into a query, rejecting invalid page sizes and directions.
    ///
    /// Sort fields are checked against the columns of the collection later.
    fn into_query(self, default_sort: &str, max_page_size: u64) -> Result<Query, ApiError> {
        // Every key has to be known, a misspelled filter must not go unnoticed
        if let Some(key) = self.unknown.keys().next() {
            return Err(QueryError::FilterFieldUnknown(key.clone()).into());
        }

        let pagination = Pagination::from_request(self.limit, self.cursor, max_page_size)?;

        let direction = match &self.sort_dir {
            Some(value) => value.parse::<Direction>()?,
            None => Direction::default(),
        };
        let order = Order::new(self.sort.as_deref().unwrap_or(default_sort), &direction);

        Ok(Query::new(&pagination, &self.filter.into_filter(), &order))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpsertRequest<F> {
    /// Row to update, a new row gets created when not set.
    pub id: Option<i64>,
    #[serde(flatten)]
    pub fields: F,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub id: i64,
}

/// Handle list requests for a collection.
pub async fn handle_list<C: Collection>(
    Extension(context): Extension<HttpServiceContext>,
    actor: ActorContext,
    payload: Result<Json<ListRequest<C::Filter>>, JsonRejection>,
) -> Result<Json<Page<C::Row>>, ApiError> {
    let Json(request) = payload?;

    let scope = actor.list_scope::<C>()?;
    let query = request.into_query(C::DEFAULT_SORT, context.max_page_size)?;
    let page = context.store.query::<C>(&query, scope.as_ref()).await?;

    debug!(
        "Listed {} {} for user {:?}",
        page.items.len(),
        C::NAME,
        actor.user_id
    );

    Ok(Json(page))
}

/// Handle create and update requests for a collection.
pub async fn handle_upsert<C: Collection>(
    Extension(context): Extension<HttpServiceContext>,
    actor: ActorContext,
    payload: Result<Json<UpsertRequest<C::Fields>>, JsonRejection>,
) -> Result<Json<C::Row>, ApiError> {
    let Json(request) = payload?;

    let upsert = Upsert::from_request(request.id, request.fields);
    let row = mutation::upsert::<C>(&context.store, &actor, upsert).await?;

    Ok(Json(row))
}

/// Handle delete requests for a collection.
pub async fn handle_delete<C: Collection>(
    Extension(context): Extension<HttpServiceContext>,
    actor: ActorContext,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<DeleteRequest>, ApiError> {
    let Json(request) = payload?;

    let id = mutation::delete::<C>(&context.store, &actor, request.id).await?;

    Ok(Json(DeleteRequest { id }))
}

pub async fn handle_health() -> &'static str {
    "ok"
}

pub async fn handle_not_found() -> ApiError {
    ApiError::new(ErrorKind::NotFound, "Unknown route")
}
