//! CLI argument definitions for cepfast.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `CEP` | `01153000` | Postal code to look up |
//! | `--timeout-ms` | `API_TIMEOUT` or 1000 | Race deadline in ms |
//! | `--max-attempts` | `CEPFAST_MAX_ATTEMPTS` or 3 | Attempts per source |
//! | `--policy` | `CEPFAST_FAILURE_POLICY` or `short-circuit` | What a failed source does to the race |
//! | `--format` | `text` | Output format (text, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! Flags override the environment, which overrides the built-in defaults.
//!
//! # Examples
//!
//! ```bash
//! cepfast
//! cepfast 01310100 --timeout-ms 500
//! cepfast 01310100 --policy await-all --format json --pretty
//! ```

use std::time::Duration;

use cepfast_core::{FailurePolicy, RaceConfig};
use clap::{Parser, ValueEnum};

pub const DEFAULT_CEP: &str = "01153000";

/// Look up a Brazilian postal code (CEP) on BrasilAPI and ViaCEP at once and
/// print whichever answers first.
#[derive(Debug, Parser)]
#[command(
    name = "cepfast",
    author,
    version,
    about = "First-success CEP lookup across BrasilAPI and ViaCEP",
    long_about = "Sends the same postal code to BrasilAPI and ViaCEP concurrently and prints the \
first successful answer. The whole lookup is bounded by a single deadline.\n\
\n\
Logging is controlled with RUST_LOG and written to stderr."
)]
pub struct Cli {
    /// Postal code to look up.
    #[arg(default_value = DEFAULT_CEP)]
    pub cep: String,

    /// Race deadline in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Attempts per source, including the first one.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// What a source that exhausts its retries does to the race.
    ///
    /// - short-circuit: the race fails immediately
    /// - await-all: keep waiting for the other sources
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Output format for the result.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Override the BrasilAPI base URL.
    #[arg(long)]
    pub brasil_api_url: Option<String>,

    /// Override the ViaCEP base URL.
    #[arg(long)]
    pub viacep_url: Option<String>,
}

impl Cli {
    /// Layer the flags that were given on top of `config`.
    pub fn apply(&self, mut config: RaceConfig) -> RaceConfig {
        if let Some(timeout_ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(timeout_ms));
        }
        if let Some(max_attempts) = self.max_attempts {
            config = config.with_max_attempts(max_attempts);
        }
        if let Some(policy) = self.policy {
            config = config.with_failure_policy(policy.into());
        }
        if let Some(url) = &self.brasil_api_url {
            config = config.with_brasil_api_url(url.as_str());
        }
        if let Some(url) = &self.viacep_url {
            config = config.with_viacep_url(url.as_str());
        }
        config
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line.
    Text,
    /// A single JSON object.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    ShortCircuit,
    AwaitAll,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::ShortCircuit => Self::ShortCircuit,
            PolicyArg::AwaitAll => Self::AwaitAll,
        }
    }
}
