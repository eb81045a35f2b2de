// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::db::SqlStore;

#[derive(Clone, Debug)]
pub struct HttpServiceContext {
    /// SQL database.
    pub store: SqlStore,

    /// Largest page size clients can ask for.
    pub max_page_size: u64,
}

impl HttpServiceContext {
    pub fn new(store: SqlStore, max_page_size: u64) -> Self {
        Self {
            store,
            max_page_size,
        }
    }
}
