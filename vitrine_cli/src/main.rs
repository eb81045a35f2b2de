// SPDX-License-Identifier: AGPL-3.0-or-later

mod config;
mod utils;

use anyhow::Context;
use log::warn;
use vitrine::Node;

use crate::config::{load_config, print_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from command line arguments, environment variables and .toml file
    let (config_file_path, config) = load_config().context("Could not load configuration")?;

    // Set log verbosity based on config. By default scope it always to the "vitrine" module.
    env_logger::Builder::new()
        .parse_filters(&config.log_filter())
        .init();

    // Show configuration info to the user
    println!("{}", print_config(config_file_path, &config.node));

    // Start server in async runtime
    let node = Node::start(config.node)
        .await
        .context("Could not start server")?;

    // Run this until [CTRL] + [C] got pressed or something went wrong
    tokio::select! {
        _ = tokio::signal::ctrl_c() => (),
        _ = node.on_exit() => warn!("A service stopped unexpectedly"),
    }

    // Wait until all tasks are gracefully shut down and exit
    node.shutdown().await;

    Ok(())
}
