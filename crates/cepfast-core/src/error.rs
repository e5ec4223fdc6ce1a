use std::time::Duration;

use thiserror::Error;

use crate::fetcher::FetchError;

/// Validation errors for user-supplied lookup inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("postal code cannot be empty")]
    EmptyPostalCode,

    #[error("unknown source '{value}', expected one of BrasilAPI, ViaCEP")]
    UnknownSource { value: String },
}

/// Errors raised while reading race configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid duration '{value}', expected values like 500ms, 1s or 1m30s")]
    InvalidDuration { value: String },

    #[error("invalid attempt cap '{value}', expected a positive integer")]
    InvalidAttempts { value: String },

    #[error("invalid failure policy '{value}', expected one of short-circuit, await-all")]
    InvalidFailurePolicy { value: String },

    #[error("{name} must not be empty")]
    EmptyUrl { name: &'static str },
}

/// Terminal failure of a whole race.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RaceError {
    #[error("race timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error(transparent)]
    SourceFailed(FetchError),

    #[error("all sources failed: {}", summarize(.0))]
    AllFailed(Vec<FetchError>),

    #[error("no sources configured for the race")]
    NoSources,
}

impl RaceError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "race.timeout",
            Self::SourceFailed(_) => "race.source_failed",
            Self::AllFailed(_) => "race.all_failed",
            Self::NoSources => "race.no_sources",
        }
    }

    /// Source failures carried by this error, empty for timeouts.
    pub fn failures(&self) -> &[FetchError] {
        match self {
            Self::SourceFailed(error) => std::slice::from_ref(error),
            Self::AllFailed(errors) => errors,
            Self::Timeout { .. } | Self::NoSources => &[],
        }
    }

    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn summarize(errors: &[FetchError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchErrorKind;
    use crate::source::SourceId;

    #[test]
    fn all_failed_lists_every_source() {
        let error = RaceError::AllFailed(vec![
            FetchError::new(
                SourceId::BrasilApi,
                FetchErrorKind::Transport,
                "connection refused",
                Duration::from_millis(12),
            ),
            FetchError::new(
                SourceId::ViaCep,
                FetchErrorKind::UpstreamStatus,
                "upstream returned status 503",
                Duration::from_millis(40),
            ),
        ]);

        let rendered = error.to_string();
        assert!(rendered.contains("BrasilAPI"), "{rendered}");
        assert!(rendered.contains("ViaCEP"), "{rendered}");
        assert_eq!(error.failures().len(), 2);
    }

    #[test]
    fn timeout_reports_budget_in_millis() {
        let error = RaceError::Timeout {
            timeout: Duration::from_secs(1),
        };

        assert_eq!(error.to_string(), "race timed out after 1000ms");
        assert!(error.failures().is_empty());
        assert!(error.is_timeout());
    }
}
