// SPDX-License-Identifier: AGPL-3.0-or-later

mod client;
mod config;
mod db;
mod node;
mod runner;

pub use client::{http_test_client, TestClient};
pub use config::TestConfiguration;
pub use db::initialize_db;
pub use node::{add_articles, add_requests, add_services, add_user, TestNode};
pub use runner::test_runner;
