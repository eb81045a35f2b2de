// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::db::{connection_pool, create_database, run_pending_migrations, Pool};
use crate::test_utils::config::TEST_CONFIG;

/// Create test database.
///
/// Tests use a single connection, in-memory SQLite databases are only shared between connections
/// of the same pool with a shared cache which doesn't allow concurrent writes.
pub async fn initialize_db() -> Pool {
    let url = &TEST_CONFIG.database_url;
    create_database(url).await.unwrap();

    // Create connection pool and run all migrations
    let pool = connection_pool(url, 1).await.unwrap();
    run_pending_migrations(&pool)
        .await
        .expect("Could not run migrations");

    pool
}
