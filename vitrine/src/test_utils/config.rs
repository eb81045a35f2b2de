// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Debug;

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Configuration read from the environment once for all tests.
pub static TEST_CONFIG: Lazy<TestConfiguration> = Lazy::new(TestConfiguration::new);

/// Configuration used in test helper methods.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct TestConfiguration {
    /// Database url, every test gets its own fresh in-memory SQLite database by default.
    pub database_url: String,
}

impl TestConfiguration {
    pub fn new() -> Self {
        envy::from_env::<TestConfiguration>()
            .expect("Could not read environment variables for test configuration")
    }
}

impl Default for TestConfiguration {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
        }
    }
}
