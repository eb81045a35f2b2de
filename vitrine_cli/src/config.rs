// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{crate_version, Parser};
use colored::Colorize;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use vitrine::Configuration;

use crate::utils::absolute_path;

const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_LOG_LEVEL: &str = "info";

type ConfigFilePath = Option<PathBuf>;

/// Settings of the command line program, merged from all configuration sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Log verbosity, scoped to "vitrine" unless a full filter is given.
    pub log_level: String,

    /// Settings of the server itself.
    #[serde(flatten)]
    pub node: Configuration,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.into(),
            node: Configuration::default(),
        }
    }
}

impl ConfigFile {
    /// Returns the filter string for the logger.
    pub fn log_filter(&self) -> String {
        if self.log_level.contains('=') {
            self.log_level.clone()
        } else {
            format!("vitrine={}", self.log_level)
        }
    }
}

/// Get configuration from 1. .toml file, 2. environment variables and 3. command line arguments
/// (in that order, meaning that later configuration sources take precedence over the earlier
/// ones).
pub fn load_config() -> Result<(ConfigFilePath, ConfigFile)> {
    // Parse command line arguments first to get optional config file path
    let cli = Cli::parse();

    // Determine if a config file path was provided or if we should look for it in common locations
    let config_file_path: ConfigFilePath = match &cli.config {
        Some(path) => {
            if !path.exists() {
                bail!("Config file '{}' does not exist", path.display());
            }

            Some(path.clone())
        }
        None => try_determine_config_file_path(),
    };

    let config = merge_config(cli, config_file_path.as_ref())?;

    Ok((config_file_path, config))
}

fn merge_config(cli: Cli, config_file_path: Option<&PathBuf>) -> Result<ConfigFile> {
    let mut figment = Figment::from(Serialized::defaults(ConfigFile::default()));
    if let Some(path) = config_file_path {
        figment = figment.merge(Toml::file(path));
    }

    let config = figment
        .merge(Env::raw())
        .merge(Serialized::defaults(cli))
        .extract()?;

    Ok(config)
}

/// Configuration derived from command line arguments.
///
/// All arguments are optional and don't get serialized to Figment when they're None. This is to
/// assure that default values do not overwrite all previous settings, especially when they haven't
/// been set.
#[derive(Parser, Serialize, Debug)]
#[command(
    name = "vitrine",
    about = "Content and commerce backend with paginated RPC listings",
    long_about = None,
    version
)]
struct Cli {
    /// Path to an optional "config.toml" file for further configuration.
    ///
    /// When not set the program will try to find a `config.toml` file in the same folder the
    /// program is executed in and otherwise in the regarding operation systems XDG config
    /// directory ("$HOME/.config/vitrine/config.toml" on Linux).
    #[arg(short = 'c', long, value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PathBuf>,

    /// URL / connection string to the SQLite database. Defaults to an in-memory database.
    ///
    /// WARNING: By default nothing gets persisted after shutdown. Set a database connection url
    /// for production settings to not loose data.
    #[arg(short = 'd', long, value_name = "CONNECTION_STRING")]
    #[serde(skip_serializing_if = "Option::is_none")]
    database_url: Option<String>,

    /// Maximum number of connections the database pool keeps open. Defaults to 32.
    #[arg(long, value_name = "NUM")]
    #[serde(skip_serializing_if = "Option::is_none")]
    database_max_connections: Option<u32>,

    /// HTTP port serving the RPC API. Defaults to 2020.
    #[arg(short = 'p', long, value_name = "PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    http_port: Option<u16>,

    /// Largest page size clients can request when listing rows. Defaults to 100.
    #[arg(short = 'm', long, value_name = "NUM")]
    #[serde(skip_serializing_if = "Option::is_none")]
    max_page_size: Option<u64>,

    /// Set log verbosity. Use this for learning more about how the server behaves or for
    /// debugging.
    ///
    /// Possible log levels are: ERROR, WARN, INFO, DEBUG, TRACE. They are scoped to "vitrine" by
    /// default.
    ///
    /// If you want to adjust the scope for deeper inspection use a filter value, for example
    /// "=TRACE" for logging _everything_ or "vitrine=INFO,sqlx=DEBUG" etc.
    #[arg(short = 'l', long, value_name = "LEVEL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
}

fn try_determine_config_file_path() -> Option<PathBuf> {
    // Find config file in current folder
    let current_dir = std::env::current_dir()
        .ok()
        .map(|dir| dir.join(CONFIG_FILE_NAME));

    // Find config file in XDG config folder
    let xdg_config_dir = ProjectDirs::from("", "", "vitrine")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME));

    [current_dir, xdg_config_dir]
        .iter()
        .flatten()
        .find(|path| path.exists())
        .cloned()
}

pub fn print_config(config_file_path: ConfigFilePath, config: &Configuration) -> String {
    println!("{} v{}\n", "vitrine".underline(), crate_version!());

    match config_file_path {
        Some(path) => {
            println!(
                "Loading config file from {}",
                absolute_path(path).display().to_string().blue()
            );
        }
        None => {
            println!("No config file provided");
        }
    }

    println!();
    println!("{}\n", "Configuration".underline());

    let database_url = if config.database_url == "sqlite::memory:"
        || config.database_url.contains("mode=memory")
    {
        "memory (data is not persisted)".into()
    } else {
        format!("SQLite: {}", config.database_url)
    };

    format!(
        r"Database URL: {}
Database connections: {}
HTTP port: {}
Max. page size: {}

Server is ready!
",
        database_url.blue(),
        config.database_max_connections.to_string().blue(),
        config.http_port.to_string().blue(),
        config.max_page_size.to_string().blue(),
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::{merge_config, Cli, ConfigFile};

    #[test]
    fn defaults_without_sources() {
        let cli = Cli::parse_from(["vitrine"]);
        let config = merge_config(cli, None).unwrap();

        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.log_filter(), "vitrine=info");
    }

    #[test]
    fn arguments_take_precedence_over_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "http_port = 3030\nmax_page_size = 50\nlog_level = \"=debug\"\n",
        )
        .unwrap();

        let cli = Cli::parse_from(["vitrine", "--http-port", "4040"]);
        let config = merge_config(cli, Some(&path)).unwrap();

        assert_eq!(config.node.http_port, 4040);
        assert_eq!(config.node.max_page_size, 50);
        assert_eq!(config.node.database_url, "sqlite::memory:");
        assert_eq!(config.log_filter(), "=debug");
    }
}
