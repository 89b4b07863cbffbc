//! Command-line arguments.

use clap::Parser;
use clap::builder::FalseyValueParser;
use std::path::PathBuf;

/// Provision a dataset on a remote full-text search service
#[derive(Parser, Debug)]
#[command(name = "corpora", author, version, about, long_about = None)]
pub struct Cli {
    /// Dataset to load (prompted for when omitted)
    #[arg(short, long, value_name = "NAME")]
    pub dataset: Option<String>,

    /// List the registered datasets and exit
    #[arg(long)]
    pub list: bool,

    /// Base URL of the search service
    #[arg(long, env = "CORPORA_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Bearer token (takes precedence over email + password)
    #[arg(long, env = "CORPORA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Account email used to log in when no token is given
    #[arg(long, env = "CORPORA_EMAIL")]
    pub email: Option<String>,

    /// Account password used to log in when no token is given
    #[arg(long, env = "CORPORA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Directory the dataset files are resolved against
    #[arg(long, env = "CORPORA_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Skip TLS certificate validation (loopback hosts only)
    #[arg(long, env = "CORPORA_INSECURE", value_parser = FalseyValueParser::new())]
    pub insecure: bool,

    /// Timeout for each HTTP request except the data upload
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Give up waiting for the load after this long
    #[arg(long, value_name = "SECS")]
    pub load_timeout: Option<u64>,

    /// Give up waiting for the index after this long
    #[arg(long, value_name = "SECS")]
    pub index_timeout: Option<u64>,

    /// Delay between status polls
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// Configuration file (defaults to <config dir>/corpora/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show diagnostic logs (honours RUST_LOG)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print the final summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
