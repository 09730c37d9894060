//! CLI entry point - the composition root.
//!
//! Loads `.env`, parses arguments, installs the tracing subscriber and
//! dispatches to a handler. Handlers never read the environment themselves.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use toolgate_cli::{Cli, CliError, Commands, handlers};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads `env = ...` fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<CliError>()
                .map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.into_command() {
        Commands::Serve(args) => handlers::serve::execute(args).await,
        Commands::Import { file, database } => handlers::import::execute(&file, &database).await,
        Commands::Resolve {
            connector_id,
            source,
        } => handlers::resolve::execute(&connector_id, &source.catalog_source()).await,
    }
}
