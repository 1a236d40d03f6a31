//! SWAPI Explorer - browse the Star Wars API from the terminal
//!
//! Looks up characters, films and planets, caches every response for the
//! session, and prints them as text cards.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use swapi_explorer::api::error_message;
use swapi_explorer::app;
use swapi_explorer::cli::Cli;
use swapi_explorer::config::Config;
use swapi_explorer::explorer::Explorer;

/// Installs the stderr log subscriber, filtered by `RUST_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    // Refuse to run without an endpoint
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(base_url = %config.base_url, "starting explorer");

    let explorer = match Explorer::from_config(&config) {
        Ok(explorer) => explorer,
        Err(err) => {
            eprintln!("Error: {}", error_message(&err));
            return ExitCode::FAILURE;
        }
    };

    match app::run(&explorer, &cli.command).await {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
