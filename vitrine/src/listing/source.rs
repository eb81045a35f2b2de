// SPDX-License-Identifier: AGPL-3.0-or-later

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::db::errors::StorageError;
use crate::db::query::{Filter, Page, RowCursor};
use crate::db::stores::Query;
use crate::db::traits::Collection;
use crate::db::SqlStore;

/// Anything which can deliver pages of items, starting at a cursor.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Errors need to be cloneable as every caller waiting for a fetch receives the result.
    type Error: Clone + Send + Sync + 'static;

    /// Fetches the page starting at the given cursor, or the first page if no cursor was given.
    async fn fetch(&self, cursor: Option<RowCursor>) -> Result<Page<Self::Item>, Self::Error>;
}

/// Pages through a collection in the local database.
#[derive(Debug, Clone)]
pub struct StoreSource<C: Collection> {
    store: SqlStore,
    query: Query,
    scope: Option<Filter>,
    _collection: PhantomData<fn() -> C>,
}

impl<C: Collection> StoreSource<C> {
    /// Returns a source running the given query, optionally restricted to a scope.
    ///
    /// The cursor of the query is ignored, pages start wherever the listing asks them to.
    pub fn new(store: SqlStore, query: Query, scope: Option<Filter>) -> Self {
        Self {
            store,
            query,
            scope,
            _collection: PhantomData,
        }
    }
}

#[async_trait]
impl<C: Collection> PageSource for StoreSource<C> {
    type Item = C::Row;
    type Error = StorageError;

    async fn fetch(&self, cursor: Option<RowCursor>) -> Result<Page<C::Row>, StorageError> {
        let mut query = self.query.clone();
        query.pagination.after = cursor;
        self.store.query::<C>(&query, self.scope.as_ref()).await
    }
}
