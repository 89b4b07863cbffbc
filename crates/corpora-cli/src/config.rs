//! Settings resolution: command line and environment over the TOML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use corpora_client::{ClientConfig, Credentials};
use corpora_core::poll::DEFAULT_POLL_INTERVAL;
use corpora_workflows::LoadOptions;

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Base URL of the search service
    pub base_url: Option<String>,
    /// Bearer token
    pub token: Option<String>,
    /// Account email
    pub email: Option<String>,
    /// Account password
    pub password: Option<String>,
    /// Data directory
    pub data_dir: Option<PathBuf>,
    /// Skip certificate validation (loopback only)
    pub insecure: bool,
    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Load wait limit in seconds
    pub load_timeout_secs: Option<u64>,
    /// Index wait limit in seconds
    pub index_timeout_secs: Option<u64>,
    /// Poll interval in milliseconds
    pub poll_interval_ms: Option<u64>,
}

impl FileConfig {
    /// Default location: `<config dir>/corpora/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("corpora").join("config.toml"))
    }

    /// Loads the file at `explicit`, or the default file if it exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::parse(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parses TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL, if any source gave one
    pub base_url: Option<String>,
    /// Bearer token
    pub token: Option<String>,
    /// Account email
    pub email: Option<String>,
    /// Account password
    pub password: Option<String>,
    /// Data directory
    pub data_dir: PathBuf,
    /// Skip certificate validation
    pub insecure: bool,
    /// Per-request timeout
    pub request_timeout: Option<Duration>,
    /// Load wait limit
    pub load_timeout: Option<Duration>,
    /// Index wait limit
    pub index_timeout: Option<Duration>,
    /// Delay between status polls
    pub poll_interval: Duration,
}

impl Settings {
    /// Layers command-line and environment values over the file.
    pub fn merge(cli: &Cli, file: FileConfig) -> Self {
        let secs = |v: Option<u64>| v.map(Duration::from_secs);
        Self {
            base_url: cli.base_url.clone().or(file.base_url),
            token: cli.token.clone().or(file.token),
            email: cli.email.clone().or(file.email),
            password: cli.password.clone().or(file.password),
            data_dir: cli
                .data_dir
                .clone()
                .or(file.data_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            insecure: cli.insecure || file.insecure,
            request_timeout: secs(cli.request_timeout.or(file.request_timeout_secs)),
            load_timeout: secs(cli.load_timeout.or(file.load_timeout_secs)),
            index_timeout: secs(cli.index_timeout.or(file.index_timeout_secs)),
            poll_interval: cli
                .poll_interval
                .or(file.poll_interval_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        }
    }

    /// Builds the immutable client configuration.
    pub fn client_config(&self) -> corpora_core::Result<ClientConfig> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| corpora_core::Error::config("no base URL configured"))?;
        let credentials = Credentials::resolve(
            self.token.clone(),
            self.email.clone(),
            self.password.clone(),
        )?;

        Ok(ClientConfig::new(base_url, credentials)?
            .with_insecure(self.insecure)?
            .with_request_timeout(self.request_timeout))
    }

    /// Options for the load workflow.
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_data_dir(&self.data_dir)
            .with_poll_interval(self.poll_interval)
            .with_load_timeout(self.load_timeout)
            .with_index_timeout(self.index_timeout)
    }
}
