// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::{bail, Result};

use crate::config::Configuration;
use crate::context::Context;
use crate::db::SqlStore;
use crate::db::{connection_pool, create_database, run_pending_migrations, Pool};
use crate::http::http_service;
use crate::manager::ServiceManager;

/// Makes sure database is created and migrated before returning connection pool.
async fn initialize_db(config: &Configuration) -> Result<Pool> {
    // Create database when not existing
    create_database(&config.database_url).await?;

    // Create connection pool
    let pool = connection_pool(&config.database_url, config.database_max_connections).await?;

    // Run pending migrations
    run_pending_migrations(&pool).await?;

    Ok(pool)
}

/// Main runtime managing the server process.
#[allow(missing_debug_implementations)]
pub struct Node {
    pool: Pool,
    manager: ServiceManager<Context>,
}

impl Node {
    /// Start the server with your configuration. This method can be used to run it within other
    /// applications.
    ///
    /// Resolves as soon as the HTTP service accepts connections.
    pub async fn start(config: Configuration) -> Result<Self> {
        // Initialize database and get connection pool
        let pool = initialize_db(&config).await?;
        let store = SqlStore::new(pool.clone());

        // Create service manager with shared data between services
        let context = Context::new(store, config);
        let mut manager = ServiceManager::<Context>::new(context);

        // Start HTTP server with RPC API
        if manager.add("http", http_service).await.is_err() {
            pool.close().await;
            bail!("Failed starting HTTP service");
        }

        Ok(Self { pool, manager })
    }

    /// This future resolves when at least one system service stopped.
    ///
    /// It can be used to exit the application as a stopped service usually means that something
    /// went wrong.
    pub async fn on_exit(&self) {
        self.manager.on_exit().await;
    }

    /// Close all running concurrent tasks and wait until they are fully shut down.
    pub async fn shutdown(self) {
        // Wait until all tasks are shut down
        self.manager.shutdown().await;

        // Close connection pool
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use crate::Configuration;

    use super::Node;

    #[tokio::test]
    async fn start_and_shutdown() {
        let config = Configuration {
            // Let the operating system pick a free port
            http_port: 0,
            ..Configuration::default()
        };

        let node = Node::start(config).await.expect("Node starts");
        node.shutdown().await;
    }
}
