// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};

use crate::db::query::DEFAULT_MAX_PAGE_SIZE;

/// Configuration object holding all important variables throughout the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// URL / connection string to the SQLite database.
    pub database_url: String,

    /// Maximum number of connections that the database pool should maintain.
    ///
    /// Be mindful of the connection limits for the database as well as other applications which
    /// may want to connect to the same database.
    pub database_max_connections: u32,

    /// HTTP port, serving the RPC API (for example hosted under
    /// http://localhost:2020/rpc/articles.list). Defaults to 2020.
    pub http_port: u16,

    /// Largest number of rows clients can request with one page. Defaults to 100.
    pub max_page_size: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            database_max_connections: 32,
            http_port: 2020,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}
