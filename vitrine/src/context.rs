// SPDX-License-Identifier: AGPL-3.0-or-later

use std::ops::Deref;
use std::sync::Arc;

use crate::config::Configuration;
use crate::db::SqlStore;

/// Inner data shared across all services.
#[derive(Debug)]
pub struct Data {
    /// Server configuration.
    pub config: Configuration,

    /// Storage provider with database connection pool.
    pub store: SqlStore,
}

impl Data {
    pub fn new(store: SqlStore, config: Configuration) -> Self {
        Self { config, store }
    }
}

/// Data shared across all services.
#[derive(Debug, Clone)]
pub struct Context(pub Arc<Data>);

impl Context {
    /// Returns a new instance of `Context`.
    pub fn new(store: SqlStore, config: Configuration) -> Self {
        Self(Arc::new(Data::new(store, config)))
    }
}

impl Deref for Context {
    type Target = Data;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
