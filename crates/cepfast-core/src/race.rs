//! First-success race across every configured source.
//!
//! ```text
//!             ┌──── fetch_with_retry(BrasilAPI) ───┐ success (cap 1)
//! race(query) ┤                                    ├──────────────────┐
//!             └──── fetch_with_retry(ViaCEP) ──────┘ failure (cap N)  │
//!                                                                     ▼
//!                        select { success | failure | deadline } → cancel token
//! ```
//!
//! One [`CancellationToken`] scopes the whole race. It is cancelled as soon
//! as the race resolves, whichever way, and every fetcher checks it before
//! each attempt, during each backoff wait and before delivering a result.

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::fetcher::{millis, FetchError, Fetcher};
use crate::http_client::HttpClient;
use crate::{Address, ConfigError, PostalCode, RaceConfig, RaceError, SourceDescriptor, SourceId};

/// What a source's exhausted retries do to the race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The first terminal failure ends the race, even if another source is still running.
    #[default]
    ShortCircuit,
    /// Keep waiting for the remaining sources; fail only when all have failed.
    AwaitAll,
}

impl FailurePolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortCircuit => "short-circuit",
            Self::AwaitAll => "await-all",
        }
    }
}

impl Display for FailurePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "short-circuit" => Ok(Self::ShortCircuit),
            "await-all" => Ok(Self::AwaitAll),
            _ => Err(ConfigError::InvalidFailurePolicy {
                value: value.to_owned(),
            }),
        }
    }
}

/// The single successful outcome of a race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceWinner {
    pub address: Address,
    pub source: SourceId,
    /// Time from race start until the winning result was produced.
    pub elapsed: Duration,
}

/// Races one query across an ordered list of sources.
pub struct RaceCoordinator {
    fetcher: Arc<Fetcher>,
    sources: Vec<SourceDescriptor>,
    timeout: Duration,
    failure_policy: FailurePolicy,
}

impl RaceCoordinator {
    /// Build a coordinator from configuration and an injected transport.
    pub fn new(http_client: Arc<dyn HttpClient>, config: &RaceConfig) -> Self {
        let fetcher = Fetcher::new(http_client).with_policy(config.retry);
        Self::with_sources(fetcher, config.sources(), config.timeout)
            .with_failure_policy(config.failure_policy)
    }

    pub fn with_sources(fetcher: Fetcher, sources: Vec<SourceDescriptor>, timeout: Duration) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            sources,
            timeout,
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Resolve `query` to exactly one winner, one failure, or a timeout.
    pub async fn race(&self, query: &PostalCode) -> Result<RaceWinner, RaceError> {
        let race_id = Uuid::new_v4();
        let span = info_span!("race", %race_id, postal_code = %query);
        self.run(query).instrument(span).await
    }

    async fn run(&self, query: &PostalCode) -> Result<RaceWinner, RaceError> {
        if self.sources.is_empty() {
            warn!("race has no sources");
            return Err(RaceError::NoSources);
        }

        let started = Instant::now();
        let cancel = CancellationToken::new();
        // Also cancels if the caller drops this future mid-race.
        let _cancel_on_exit = cancel.clone().drop_guard();

        let (result_tx, mut result_rx) = mpsc::channel::<RaceWinner>(1);
        let (error_tx, mut error_rx) = mpsc::channel::<FetchError>(self.sources.len());

        info!(
            sources = self.sources.len(),
            timeout_ms = millis(self.timeout),
            policy = %self.failure_policy,
            "race started"
        );

        for descriptor in &self.sources {
            let fetcher = Arc::clone(&self.fetcher);
            let descriptor = descriptor.clone();
            let query = query.clone();
            let cancel = cancel.clone();
            let result_tx = result_tx.clone();
            let error_tx = error_tx.clone();

            tokio::spawn(
                async move {
                    if cancel.is_cancelled() {
                        return;
                    }

                    match fetcher.fetch_with_retry(&descriptor, &query, &cancel).await {
                        Ok(address) => {
                            let winner = RaceWinner {
                                address,
                                source: descriptor.id,
                                elapsed: started.elapsed(),
                            };
                            tokio::select! {
                                biased;
                                _ = cancel.cancelled() => {
                                    debug!(source = %descriptor.id, "late success discarded");
                                }
                                sent = result_tx.send(winner) => {
                                    if sent.is_ok() {
                                        cancel.cancel();
                                    }
                                }
                            }
                        }
                        Err(error) => {
                            tokio::select! {
                                biased;
                                _ = cancel.cancelled() => {
                                    debug!(source = %descriptor.id, "late failure discarded");
                                }
                                _ = error_tx.send(error) => {}
                            }
                        }
                    }
                }
                .in_current_span(),
            );
        }
        drop(result_tx);
        drop(error_tx);

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);
        let mut failures = Vec::new();

        let outcome = loop {
            tokio::select! {
                biased;
                Some(winner) = result_rx.recv() => break Ok(winner),
                () = &mut deadline => break Err(RaceError::Timeout { timeout: self.timeout }),
                Some(error) = error_rx.recv() => match self.failure_policy {
                    FailurePolicy::ShortCircuit => break Err(RaceError::SourceFailed(error)),
                    FailurePolicy::AwaitAll => {
                        debug!(source = %error.source(), "source exhausted, waiting on the rest");
                        failures.push(error);
                        if failures.len() == self.sources.len() {
                            break Err(RaceError::AllFailed(failures));
                        }
                    }
                },
            }
        };
        cancel.cancel();

        let elapsed_ms = millis(started.elapsed());
        match &outcome {
            Ok(winner) => info!(source = %winner.source, elapsed_ms, "race won"),
            Err(error) if error.is_timeout() => warn!(elapsed_ms, "race timed out"),
            Err(error) => warn!(elapsed_ms, code = error.code(), error = %error, "race failed"),
        }

        outcome
    }
}
