#![forbid(unsafe_code)]

//! Corpora CLI
//!
//! Loads a registered dataset into a remote full-text search service and
//! verifies it with a test query.

mod cli;
mod config;
mod error;
mod output;
mod select;

use clap::Parser;
use std::sync::Arc;

use corpora_client::HttpSearchService;
use corpora_core::{DatasetRegistry, Phase};
use corpora_workflows::{LoadWorkflow, prepare};

use cli::Cli;
use config::{FileConfig, Settings};
use error::{CliError, CliResult, EXIT_SUCCESS};
use output::ConsoleObserver;

fn init_tracing(cli: &Cli) {
    // --quiet and the default are silent; the console observer already
    // renders warnings. --verbose honours RUST_LOG, falling back to info.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    let code = match run(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => error::report(&e),
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> CliResult<()> {
    let registry = DatasetRegistry::builtin();
    if cli.list {
        output::print_datasets(&registry);
        return Ok(());
    }

    let settings = Settings::merge(&cli, FileConfig::load(cli.config.as_deref())?);
    let name = match &cli.dataset {
        Some(name) => name.clone(),
        None => select::pick_dataset(&registry)?,
    };
    let descriptor = registry.resolve(&name)?;

    // Local checks first: nothing goes over the wire for a bad file or
    // an incomplete configuration.
    let options = settings.load_options();
    let prepared = prepare(descriptor, &options).await?;
    let client_config = settings.client_config()?;

    let observer = Arc::new(ConsoleObserver::new(cli.quiet));
    let load = async {
        let service = HttpSearchService::connect(client_config)
            .await
            .map_err(|e| e.in_phase(Phase::Open))?;
        LoadWorkflow::new(Arc::new(service), options)
            .with_observer(observer)
            .execute(&prepared)
            .await
    };

    let report = tokio::select! {
        result = load => result?,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!(dataset = %prepared.descriptor.name, "Interrupted");
            return Err(CliError::Interrupted);
        }
    };

    output::print_report(&report, cli.quiet);
    Ok(())
}
