use std::io::{self, Write};

use cepfast_core::fetcher::millis;
use cepfast_core::{Address, FetchError, FetchErrorKind, RaceError, RaceWinner, SourceId};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct WinnerDocument<'a> {
    source: SourceId,
    address: &'a Address,
    latency_ms: u64,
}

#[derive(Debug, Serialize)]
struct ErrorDocument<'a> {
    error: ErrorBody<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: String,
    failures: Vec<FailureEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct FailureEntry<'a> {
    source: SourceId,
    kind: FetchErrorKind,
    message: &'a str,
    elapsed_ms: u64,
    attempts: u32,
}

impl<'a> From<&'a FetchError> for FailureEntry<'a> {
    fn from(error: &'a FetchError) -> Self {
        Self {
            source: error.source(),
            kind: error.kind(),
            message: error.message(),
            elapsed_ms: millis(error.elapsed()),
            attempts: error.attempts(),
        }
    }
}

pub fn render(
    outcome: &Result<RaceWinner, RaceError>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let payload = match format {
        OutputFormat::Text => render_text(outcome),
        OutputFormat::Json => render_json(outcome, pretty)?,
    };
    writeln!(out, "{payload}")?;
    Ok(())
}

fn render_text(outcome: &Result<RaceWinner, RaceError>) -> String {
    match outcome {
        Ok(winner) => format!("resultado da API {}: {}", winner.source, winner.address),
        Err(error) => format!("erro: {error}"),
    }
}

fn render_json(
    outcome: &Result<RaceWinner, RaceError>,
    pretty: bool,
) -> Result<String, serde_json::Error> {
    let value = match outcome {
        Ok(winner) => serde_json::to_value(WinnerDocument {
            source: winner.source,
            address: &winner.address,
            latency_ms: millis(winner.elapsed),
        })?,
        Err(error) => serde_json::to_value(ErrorDocument {
            error: ErrorBody {
                code: error.code(),
                message: error.to_string(),
                failures: error.failures().iter().map(FailureEntry::from).collect(),
            },
        })?,
    };

    if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
}
