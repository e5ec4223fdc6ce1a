//! # cepfast Core
//!
//! First-success race for Brazilian postal-code (CEP) lookups.
//!
//! ## Overview
//!
//! The same postal code is sent to every configured source at once. The
//! first source to answer successfully wins, its payload is normalized into
//! an [`Address`], and every other source is cancelled. A single deadline
//! bounds the whole race.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Race configuration and environment loading |
//! | [`domain`] | [`PostalCode`] and [`Address`] |
//! | [`error`] | Validation, configuration and race errors |
//! | [`fetcher`] | Single-source fetch with cancellable retries |
//! | [`http_client`] | Injected HTTP transport contract and reqwest client |
//! | [`normalize`] | BrasilAPI / ViaCEP payload mapping |
//! | [`race`] | Race coordinator |
//! | [`retry`] | Attempt cap and backoff schedule |
//! | [`source`] | Source identifiers and descriptors |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cepfast_core::{fetch_fastest, PostalCode, RaceConfig, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RaceConfig::from_env();
//!     let query = PostalCode::parse("01153000")?;
//!
//!     let winner = fetch_fastest(&query, &config, Arc::new(ReqwestHttpClient::new())).await?;
//!     println!("{}: {}", winner.source, winner.address);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / caller   │
//! └────────┬────────┘
//!          │ PostalCode + RaceConfig
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ RaceCoordinator │────▶│ CancellationToken│
//! └────────┬────────┘     └──────────────────┘
//!          │ one task per source
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Fetcher + retry │────▶│ HttpClient       │
//! └────────┬────────┘     │ (reqwest / fake) │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │ normalize       │
//! │ → Address       │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use cepfast_core::{FetchErrorKind, RaceError};
//!
//! fn describe(error: &RaceError) -> &'static str {
//!     match error {
//!         RaceError::Timeout { .. } => "no source answered in time",
//!         RaceError::SourceFailed(failure) if failure.kind() == FetchErrorKind::Decode => {
//!             "a source answered with an unexpected payload"
//!         }
//!         RaceError::SourceFailed(_) | RaceError::AllFailed(_) => "sources failed",
//!         RaceError::NoSources => "nothing to race",
//!     }
//! }
//! ```

use std::sync::Arc;

pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod normalize;
pub mod race;
pub mod retry;
pub mod source;

pub use config::{parse_duration, RaceConfig};
pub use domain::{Address, PostalCode};
pub use error::{ConfigError, RaceError, ValidationError};
pub use fetcher::{FetchError, FetchErrorKind, Fetcher};
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use normalize::{normalize, normalize_named, NormalizeError};
pub use race::{FailurePolicy, RaceCoordinator, RaceWinner};
pub use retry::{Backoff, RetryPolicy};
pub use source::{SourceDescriptor, SourceId};

/// Race `query` across every source in `config` and return the first success.
pub async fn fetch_fastest(
    query: &PostalCode,
    config: &RaceConfig,
    http_client: Arc<dyn HttpClient>,
) -> Result<RaceWinner, RaceError> {
    RaceCoordinator::new(http_client, config).race(query).await
}
