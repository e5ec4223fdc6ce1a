//! Race configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BRASIL_API_URL` | `https://brasilapi.com.br/api/cep/v1/` | BrasilAPI base URL |
//! | `VIACEP_URL` | `https://viacep.com.br/ws/` | ViaCEP base URL |
//! | `API_TIMEOUT` | `1s` | Race deadline (`500ms`, `1.5s`, `1m30s`) |
//! | `CEPFAST_MAX_ATTEMPTS` | `3` | Attempts per source |
//! | `CEPFAST_FAILURE_POLICY` | `short-circuit` | `short-circuit` or `await-all` |

use std::time::Duration;

use tracing::warn;

use crate::race::FailurePolicy;
use crate::retry::RetryPolicy;
use crate::{ConfigError, SourceDescriptor, SourceId};

pub const BRASIL_API_URL_VAR: &str = "BRASIL_API_URL";
pub const VIACEP_URL_VAR: &str = "VIACEP_URL";
pub const TIMEOUT_VAR: &str = "API_TIMEOUT";
pub const MAX_ATTEMPTS_VAR: &str = "CEPFAST_MAX_ATTEMPTS";
pub const FAILURE_POLICY_VAR: &str = "CEPFAST_FAILURE_POLICY";

pub const DEFAULT_BRASIL_API_URL: &str = "https://brasilapi.com.br/api/cep/v1/";
pub const DEFAULT_VIACEP_URL: &str = "https://viacep.com.br/ws/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Everything a race needs besides the query and the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceConfig {
    pub brasil_api_url: String,
    pub viacep_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            brasil_api_url: String::from(DEFAULT_BRASIL_API_URL),
            viacep_url: String::from(DEFAULT_VIACEP_URL),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl RaceConfig {
    /// Read the process environment, falling back to defaults on bad values.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Lenient loader: unset or empty values use defaults, invalid values log a warning and
    /// use defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let mut config = defaults.clone();

        if let Some(url) = non_empty(&lookup, BRASIL_API_URL_VAR) {
            config.brasil_api_url = url;
        }
        if let Some(url) = non_empty(&lookup, VIACEP_URL_VAR) {
            config.viacep_url = url;
        }
        if let Some(raw) = non_empty(&lookup, TIMEOUT_VAR) {
            match parse_duration(&raw) {
                Ok(timeout) => config.timeout = timeout,
                Err(error) => warn!(variable = TIMEOUT_VAR, %error, "using default timeout"),
            }
        }
        if let Some(raw) = non_empty(&lookup, MAX_ATTEMPTS_VAR) {
            match parse_attempts(&raw) {
                Ok(attempts) => config.retry = config.retry.with_max_attempts(attempts),
                Err(error) => warn!(variable = MAX_ATTEMPTS_VAR, %error, "using default attempt cap"),
            }
        }
        if let Some(raw) = non_empty(&lookup, FAILURE_POLICY_VAR) {
            match raw.parse::<FailurePolicy>() {
                Ok(policy) => config.failure_policy = policy,
                Err(error) => warn!(
                    variable = FAILURE_POLICY_VAR,
                    %error,
                    default = %defaults.failure_policy,
                    "using default failure policy"
                ),
            }
        }

        config
    }

    /// Strict loader: any set-but-invalid value is an error.
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BRASIL_API_URL_VAR) {
            config.brasil_api_url = require_url(url, BRASIL_API_URL_VAR)?;
        }
        if let Some(url) = lookup(VIACEP_URL_VAR) {
            config.viacep_url = require_url(url, VIACEP_URL_VAR)?;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            config.timeout = parse_duration(&raw)?;
        }
        if let Some(raw) = lookup(MAX_ATTEMPTS_VAR) {
            config.retry = config.retry.with_max_attempts(parse_attempts(&raw)?);
        }
        if let Some(raw) = lookup(FAILURE_POLICY_VAR) {
            config.failure_policy = raw.parse()?;
        }

        Ok(config)
    }

    pub fn with_brasil_api_url(mut self, url: impl Into<String>) -> Self {
        self.brasil_api_url = url.into();
        self
    }

    pub fn with_viacep_url(mut self, url: impl Into<String>) -> Self {
        self.viacep_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry = self.retry.with_max_attempts(max_attempts);
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Sources in dispatch order: BrasilAPI, then ViaCEP.
    pub fn sources(&self) -> Vec<SourceDescriptor> {
        SourceId::ALL
            .into_iter()
            .map(|id| SourceDescriptor::new(id, self.endpoint(id)))
            .collect()
    }

    pub fn endpoint(&self, source: SourceId) -> &str {
        match source {
            SourceId::BrasilApi => &self.brasil_api_url,
            SourceId::ViaCep => &self.viacep_url,
        }
    }
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn require_url(value: String, name: &'static str) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyUrl { name });
    }
    Ok(value)
}

fn parse_attempts(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(attempts) if attempts > 0 => Ok(attempts),
        _ => Err(ConfigError::InvalidAttempts {
            value: raw.to_owned(),
        }),
    }
}

/// Parse a duration such as `300ms`, `1.5s`, `2m` or `1m30s`.
///
/// Accepted units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`. A bare `0` is allowed.
pub fn parse_duration(raw: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration {
        value: raw.to_owned(),
    };

    let input = raw.trim();
    if input == "0" {
        return Ok(Duration::ZERO);
    }
    if input.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos: u128 = 0;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let unit_nanos: u128 = match unit {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            _ => return Err(invalid()),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let whole = if whole.is_empty() {
            0
        } else {
            whole.parse::<u128>().map_err(|_| invalid())?
        };
        let mut nanos = whole.checked_mul(unit_nanos).ok_or_else(invalid)?;

        if !fraction.is_empty() {
            let digits = fraction.parse::<u128>().map_err(|_| invalid())?;
            let scale = u32::try_from(fraction.len())
                .ok()
                .and_then(|len| 10_u128.checked_pow(len))
                .ok_or_else(invalid)?;
            let part = digits.checked_mul(unit_nanos).ok_or_else(invalid)? / scale;
            nanos = nanos.checked_add(part).ok_or_else(invalid)?;
        }

        total_nanos = total_nanos.checked_add(nanos).ok_or_else(invalid)?;
        rest = tail;
    }

    let nanos = u64::try_from(total_nanos).map_err(|_| invalid())?;
    Ok(Duration::from_nanos(nanos))
}
