// SPDX-License-Identifier: AGPL-3.0-or-later

//! Client-side accumulation of paginated results into one growing list.
//!
//! [`InfiniteListing`] loads page after page from a [`PageSource`] by following the cursor of the
//! last loaded page. It can be triggered as often as a user scrolls: while a page is loading,
//! further calls join the pending fetch instead of issuing another one.
mod source;

pub use source::{PageSource, StoreSource};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use log::debug;
use tokio_util::sync::CancellationToken;

use crate::db::query::{Page, RowCursor};

/// Errors returned when loading more items.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError<E> {
    #[error("Loading was cancelled")]
    Cancelled,

    #[error("{0}")]
    Source(E),
}

type LoadFuture<E> = Shared<BoxFuture<'static, Result<usize, ListingError<E>>>>;

struct State<T, E> {
    pages: Vec<Page<T>>,
    in_flight: Option<LoadFuture<E>>,
}

impl<T, E> State<T, E> {
    fn has_more(&self) -> bool {
        self.pages
            .last()
            .map_or(true, |page| page.next_cursor.is_some())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Growing list of items, loaded page by page.
#[allow(missing_debug_implementations)]
pub struct InfiniteListing<S: PageSource> {
    source: Arc<S>,
    state: Arc<Mutex<State<S::Item, S::Error>>>,
    cancel: CancellationToken,
}

impl<S: PageSource> InfiniteListing<S> {
    /// Returns an empty listing. Nothing gets fetched before the first call to `load_more`.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(Mutex::new(State {
                pages: Vec::new(),
                in_flight: None,
            })),
            cancel: CancellationToken::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns all pages loaded so far.
    pub fn pages(&self) -> Vec<Page<S::Item>> {
        lock(&self.state).pages.clone()
    }

    /// Returns the items of all loaded pages in the order the source returned them.
    pub fn items(&self) -> Vec<S::Item> {
        lock(&self.state)
            .pages
            .iter()
            .flat_map(|page| page.items.iter().cloned())
            .collect()
    }

    /// Returns true if more items can be loaded.
    pub fn has_more(&self) -> bool {
        !self.cancel.is_cancelled() && lock(&self.state).has_more()
    }

    /// Returns true while a page is being fetched.
    pub fn is_loading(&self) -> bool {
        lock(&self.state).in_flight.is_some()
    }

    /// Loads the next page and returns the number of items it added.
    ///
    /// Returns `Ok(0)` without fetching anything when there is nothing more to load. Calls made
    /// while a page is already being fetched wait for that fetch and return its result, the page
    /// gets added only once. Failed fetches add nothing and can be retried.
    ///
    /// Retrying doesn't help when the cursor itself was rejected, for example because the row it
    /// points at got deleted in the meantime. Call [`reset`](Self::reset) to start over from the
    /// first page in that case.
    pub async fn load_more(&self) -> Result<usize, ListingError<S::Error>> {
        let load = {
            let mut state = lock(&self.state);

            if self.cancel.is_cancelled() {
                return Err(ListingError::Cancelled);
            }

            if let Some(load) = state.in_flight.clone() {
                load
            } else if !state.has_more() {
                return Ok(0);
            } else {
                let cursor = state.pages.last().and_then(|page| page.next_cursor);
                let load = fetch_page(
                    self.source.clone(),
                    self.state.clone(),
                    self.cancel.clone(),
                    cursor,
                )
                .boxed()
                .shared();

                state.in_flight = Some(load.clone());
                load
            }
        };

        load.await
    }

    /// Drops all loaded pages so the next call to `load_more` starts again with the first page.
    ///
    /// Nothing happens while a page is being fetched, returns true if the listing was reset.
    pub fn reset(&self) -> bool {
        let mut state = lock(&self.state);

        if state.in_flight.is_some() {
            return false;
        }

        state.pages.clear();
        true
    }

    /// Aborts a pending fetch and stops loading any further pages.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl<S: PageSource> Drop for InfiniteListing<S> {
    fn drop(&mut self) {
        self.cancel.cancel();

        // The pending fetch holds a reference to the state
        lock(&self.state).in_flight = None;
    }
}

async fn fetch_page<S: PageSource>(
    source: Arc<S>,
    state: Arc<Mutex<State<S::Item, S::Error>>>,
    cancel: CancellationToken,
    cursor: Option<RowCursor>,
) -> Result<usize, ListingError<S::Error>> {
    let result = tokio::select! {
        _ = cancel.cancelled() => Err(ListingError::Cancelled),
        result = source.fetch(cursor) => result.map_err(ListingError::Source),
    };

    let mut state = lock(&state);
    state.in_flight = None;

    let page = result?;
    if cancel.is_cancelled() {
        return Err(ListingError::Cancelled);
    }

    let added = page.items.len();
    debug!(
        "Loaded page {} with {} items, has more: {}",
        state.pages.len() + 1,
        added,
        page.has_next_page()
    );
    state.pages.push(page);

    Ok(added)
}
