mod cli;
mod error;
mod output;

use std::process::ExitCode;
use std::sync::Arc;

use cepfast_core::fetcher::millis;
use cepfast_core::{fetch_fastest, PostalCode, RaceConfig, ReqwestHttpClient};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::error::{race_exit_code, CliError};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cepfast=info,cepfast_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.apply(RaceConfig::from_env());
    info!(
        brasil_api_url = %config.brasil_api_url,
        viacep_url = %config.viacep_url,
        timeout_ms = millis(config.timeout),
        max_attempts = config.retry.attempts(),
        policy = %config.failure_policy,
        "configuration loaded"
    );

    let query = PostalCode::parse(&cli.cep)?;
    let outcome = fetch_fastest(&query, &config, Arc::new(ReqwestHttpClient::new())).await;
    output::render(&outcome, cli.format, cli.pretty)?;

    match outcome {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(error) => Ok(ExitCode::from(race_exit_code(&error))),
    }
}
