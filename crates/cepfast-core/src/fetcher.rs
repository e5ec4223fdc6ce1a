//! Single-source fetch with bounded, cancellable retries.
//!
//! ```text
//! fetch_with_retry
//!   ├─ attempt 1 ── fetch ── HttpClient ── normalize
//!   ├─ wait 100ms (cancellable)
//!   ├─ attempt 2 ── fetch ...
//!   ├─ wait 200ms (cancellable)
//!   └─ attempt 3 ── fetch ... → last error
//! ```
//!
//! Cancellation is observed before every attempt and during every wait.
//! An attempt already in flight runs to completion.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest};
use crate::normalize::normalize;
use crate::retry::{backoff_wait, RetryPolicy};
use crate::{Address, PostalCode, SourceDescriptor, SourceId};

/// Fetch-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    RequestBuild,
    Transport,
    BodyRead,
    UpstreamStatus,
    Decode,
    Cancelled,
}

impl FetchErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::RequestBuild => "fetch.request_build",
            Self::Transport => "fetch.transport",
            Self::BodyRead => "fetch.body_read",
            Self::UpstreamStatus => "fetch.upstream_status",
            Self::Decode => "fetch.decode",
            Self::Cancelled => "fetch.cancelled",
        }
    }
}

impl From<HttpErrorKind> for FetchErrorKind {
    fn from(kind: HttpErrorKind) -> Self {
        match kind {
            HttpErrorKind::Build => Self::RequestBuild,
            HttpErrorKind::Transport => Self::Transport,
            HttpErrorKind::Body => Self::BodyRead,
        }
    }
}

/// Terminal failure of one source, annotated with timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    source: SourceId,
    kind: FetchErrorKind,
    message: String,
    elapsed: Duration,
    attempts: u32,
}

impl FetchError {
    pub fn new(
        source: SourceId,
        kind: FetchErrorKind,
        message: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            source,
            kind,
            message: message.into(),
            elapsed,
            attempts: 1,
        }
    }

    pub fn cancelled(source: SourceId) -> Self {
        Self {
            source,
            kind: FetchErrorKind::Cancelled,
            message: String::from("race cancelled before the first attempt"),
            elapsed: Duration::ZERO,
            attempts: 0,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub const fn source(&self) -> SourceId {
        self.source
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wall time from the start of the failing attempt to its failure.
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Attempts made before giving up.
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} failed after {}ms: {} ({})",
            self.source,
            self.elapsed.as_millis(),
            self.message,
            self.code()
        )
    }
}

impl std::error::Error for FetchError {}

/// Fetches one source through a shared transport.
#[derive(Clone)]
pub struct Fetcher {
    http_client: Arc<dyn HttpClient>,
    policy: RetryPolicy,
    request_timeout: Option<Duration>,
}

impl Fetcher {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            policy: RetryPolicy::default(),
            request_timeout: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Per-attempt transport timeout. Unset by default: the race deadline bounds everything.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// One request to one source. `attempt` is 1-based and only used for logging.
    pub async fn fetch(
        &self,
        descriptor: &SourceDescriptor,
        query: &PostalCode,
        attempt: u32,
    ) -> Result<Address, FetchError> {
        let source = descriptor.id;
        let url = descriptor.url_for(query);
        let started = Instant::now();
        info!(source = %source, url = %url, attempt, "request started");

        let mut request = HttpRequest::get(url.as_str()).with_header("accept", "application/json");
        if let Some(timeout) = self.request_timeout {
            request = request.with_timeout(timeout);
        }

        let outcome = match self.http_client.execute(request).await {
            Err(error) => Err((FetchErrorKind::from(error.kind()), error.message().to_owned())),
            Ok(response) if !response.is_success() => Err((
                FetchErrorKind::UpstreamStatus,
                format!("upstream returned status {}", response.status),
            )),
            Ok(response) => normalize(source, &response.body)
                .map_err(|error| (FetchErrorKind::Decode, error.to_string())),
        };

        let elapsed = started.elapsed();
        match outcome {
            Ok(address) => {
                info!(
                    source = %source,
                    attempt,
                    elapsed_ms = millis(elapsed),
                    "request completed"
                );
                Ok(address)
            }
            Err((kind, message)) => {
                warn!(
                    source = %source,
                    attempt,
                    elapsed_ms = millis(elapsed),
                    code = kind.code(),
                    error = %message,
                    "request failed"
                );
                Err(FetchError::new(source, kind, message, elapsed))
            }
        }
    }

    /// Up to `max_attempts` sequential fetches; returns the first success or the last error.
    pub async fn fetch_with_retry(
        &self,
        descriptor: &SourceDescriptor,
        query: &PostalCode,
        cancel: &CancellationToken,
    ) -> Result<Address, FetchError> {
        let mut last_error = None;

        for attempt in 0..self.policy.attempts() {
            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                debug!(
                    source = %descriptor.id,
                    next_attempt = attempt + 1,
                    delay_ms = millis(delay),
                    "waiting before retry"
                );
            }
            if !backoff_wait(delay, cancel).await {
                debug!(source = %descriptor.id, "retries stopped by cancellation");
                break;
            }

            match self.fetch(descriptor, query, attempt + 1).await {
                Ok(address) => return Ok(address),
                Err(error) => last_error = Some(error.with_attempts(attempt + 1)),
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::cancelled(descriptor.id)))
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
