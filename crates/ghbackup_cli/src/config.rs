//! Configuration file support for ghbackup.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GHBACKUP_`, e.g., `GHBACKUP_GITHUB_TOKEN`)
//! 3. Config file (./ghbackup.toml, then ~/.config/ghbackup/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."  # or use GHBACKUP_GITHUB_TOKEN env var
//! api_url = "https://github.example.com/api/v3"  # GitHub Enterprise
//! cache_file = "~/.cache/ghbackup/token.json"
//!
//! [backup]
//! root = "/srv/backup"  # or use GHBACKUP_BACKUP_ROOT env var
//! workers = 20
//! verbose = false
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use ghbackup::github::DEFAULT_API_URL;
use ghbackup::sync::DEFAULT_CONCURRENCY;
use serde::Deserialize;

use crate::Cli;

/// Prefix for configuration environment variables.
pub const ENV_PREFIX: &str = "GHBACKUP";

/// Name of the project-local config file.
pub const LOCAL_CONFIG_FILE: &str = "ghbackup.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Backup options.
    pub backup: BackupConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Personal access token.
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise.
    pub api_url: Option<String>,
    /// Token cache file.
    pub cache_file: Option<PathBuf>,
}

/// Backup options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Directory holding the mirrors.
    pub root: Option<PathBuf>,
    /// Maximum number of repositories synchronized at once.
    pub workers: usize,
    /// Log per-repository progress instead of printing a heartbeat.
    pub verbose: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            root: None,
            workers: DEFAULT_CONCURRENCY,
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/ghbackup/config.toml)
    /// 3. Local config file (./ghbackup.toml)
    /// 4. Environment variables with GHBACKUP_ prefix
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            tracing::debug!("Loading config from ./{}", LOCAL_CONFIG_FILE);
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., GHBACKUP_BACKUP_ROOT -> backup.root
        builder = builder.add_source(environment());

        builder.build()?.try_deserialize()
    }

    /// Path of the per-user config file.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ghbackup").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("_")
        .try_parsing(true)
}

/// Effective settings for one run, after CLI flags are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: Option<String>,
    pub cache_file: Option<PathBuf>,
    pub api_url: String,
    pub root: PathBuf,
    pub workers: usize,
    pub verbose: bool,
}

impl Settings {
    /// Overlay CLI flags on the loaded configuration.
    pub fn resolve(cli: &Cli, config: Config) -> Self {
        let Config { github, backup } = config;
        Self {
            token: cli.token.clone().or(github.token),
            cache_file: cli.cache.clone().or(github.cache_file),
            api_url: cli
                .api_url
                .clone()
                .or(github.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            root: cli
                .to
                .clone()
                .or(backup.root)
                .unwrap_or_else(|| PathBuf::from(".")),
            workers: cli.workers.unwrap_or(backup.workers).max(1),
            verbose: cli.verbose || backup.verbose,
        }
    }
}
