//! Shared fixtures for the race and fetcher behaviour tests.
//!
//! [`ScriptedHttpClient`] answers each source from a queue of timed steps so
//! tests can stage "BrasilAPI answers after 50ms while ViaCEP hangs" without
//! a network. Run these tests with a paused tokio clock so every delay is
//! exact.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use cepfast_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, RaceConfig, RetryPolicy, SourceDescriptor,
    SourceId,
};
use tokio::time::Instant;

pub const BRASIL_API_BASE: &str = "http://brasilapi.test/api/cep/v1/";
pub const VIACEP_BASE: &str = "http://viacep.test/ws/";

pub const BRASIL_API_LAPA: &str = r#"{
    "cep": "01153000",
    "state": "SP",
    "city": "São Paulo",
    "neighborhood": "Lapa",
    "street": "Rua Vitorino Carmilo",
    "service": "correios"
}"#;

pub const VIACEP_LAPA: &str = r#"{
    "cep": "01153-000",
    "logradouro": "Rua Vitorino Carmilo",
    "bairro": "Lapa",
    "localidade": "São Paulo",
    "uf": "SP"
}"#;

/// Longer than any deadline used in the tests; stands in for "never answers".
pub const NEVER: Duration = Duration::from_secs(3_600);

/// One scripted reply: wait `delay`, then return `response`.
#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub response: Result<HttpResponse, HttpError>,
}

impl Step {
    pub fn ok(delay_ms: u64, body: &str) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            response: Ok(HttpResponse::ok_json(body)),
        }
    }

    pub fn status(delay_ms: u64, status: u16) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            response: Ok(HttpResponse::with_status(status, "")),
        }
    }

    pub fn unreachable(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            response: Err(HttpError::transport("connection refused")),
        }
    }

    pub fn hang() -> Self {
        Self {
            delay: NEVER,
            response: Err(HttpError::transport("request timeout")),
        }
    }
}

/// A request seen by the fake transport and when it arrived.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub at: Instant,
}

#[derive(Debug)]
struct Route {
    base: String,
    steps: VecDeque<Step>,
    last: Option<Step>,
}

/// Fake transport that replays per-source scripts. The final step of each
/// script repeats once the queue is drained.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, base: &str, steps: Vec<Step>) -> Self {
        self.routes
            .lock()
            .expect("route store should not be poisoned")
            .push(Route {
                base: base.to_owned(),
                steps: steps.into(),
                last: None,
            });
        self
    }

    pub fn brasil_api(self, steps: Vec<Step>) -> Self {
        self.route(BRASIL_API_BASE, steps)
    }

    pub fn viacep(self, steps: Vec<Step>) -> Self {
        self.route(VIACEP_BASE, steps)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .expect("call store should not be poisoned")
            .clone()
    }

    pub fn calls_to(&self, base: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.url.starts_with(base))
            .collect()
    }

    fn next_step(&self, url: &str) -> Step {
        let mut routes = self.routes.lock().expect("route store should not be poisoned");
        let Some(route) = routes.iter_mut().find(|route| url.starts_with(&route.base)) else {
            return Step {
                delay: Duration::ZERO,
                response: Err(HttpError::transport(format!("no scripted route for {url}"))),
            };
        };

        match route.steps.pop_front() {
            Some(step) => {
                route.last = Some(step.clone());
                step
            }
            None => route.last.clone().unwrap_or_else(Step::hang),
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.calls
            .lock()
            .expect("call store should not be poisoned")
            .push(RecordedCall {
                url: request.url.clone(),
                at: Instant::now(),
            });
        let step = self.next_step(&request.url);

        Box::pin(async move {
            tokio::time::sleep(step.delay).await;
            step.response
        })
    }
}

pub fn test_config(timeout_ms: u64) -> RaceConfig {
    RaceConfig::default()
        .with_brasil_api_url(BRASIL_API_BASE)
        .with_viacep_url(VIACEP_BASE)
        .with_timeout(Duration::from_millis(timeout_ms))
        .with_retry(RetryPolicy::default())
}

pub fn brasil_api() -> SourceDescriptor {
    SourceDescriptor::new(SourceId::BrasilApi, BRASIL_API_BASE)
}

pub fn viacep() -> SourceDescriptor {
    SourceDescriptor::new(SourceId::ViaCep, VIACEP_BASE)
}

/// Let every still-running fetcher task reach its next suspension point.
pub async fn settle() {
    tokio::time::sleep(Duration::from_secs(5)).await;
}
