//! Mock [`Transport`] implementations for testing.
//!
//! - [`ScriptedTransport`] - Pops one pre-loaded result per call, in order.
//!   Best for: retry behavior, error classification, header checks.
//!
//! - [`RoutedTransport`] - Answers by request path, the same way every time.
//!   Best for: fan-out scenarios where call order is not deterministic.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{sleep, Instant};

use crate::port::outbound::transport::{HttpRequest, HttpResponse, Transport, TransportError};

type Scripted = Result<HttpResponse, TransportError>;

// ---------------------------------------------------------------------------
// ScriptedTransport
// ---------------------------------------------------------------------------

/// Returns pre-loaded results in order and records every request.
///
/// Once the script is exhausted every call fails with a non-transient
/// [`TransportError::Other`].
pub struct ScriptedTransport {
    results: Mutex<VecDeque<Scripted>>,
    delays: Mutex<VecDeque<Duration>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_times: Mutex<Vec<Instant>>,
}

impl ScriptedTransport {
    pub fn new(results: Vec<Scripted>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            delays: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        }
    }

    /// Delay each call before answering, one entry per call.
    pub fn with_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock() = delays.into();
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Instant (tokio clock) at which each request arrived.
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request);
        self.call_times.lock().push(Instant::now());

        let delay = self.delays.lock().pop_front().unwrap_or_default();
        let result = self
            .results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".into())));

        if !delay.is_zero() {
            sleep(delay).await;
        }
        result
    }
}

// ---------------------------------------------------------------------------
// RoutedTransport
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Route {
    result: Scripted,
    delay: Duration,
}

/// Answers each request by its path, ignoring the base URL.
///
/// A route registered as `path?query` matches only that exact query; a bare
/// `path` route matches any query. Unrouted requests get a 404.
#[derive(Default)]
pub struct RoutedTransport {
    routes: HashMap<String, Route>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RoutedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, target: &str, result: Scripted) -> Self {
        self.route_delayed(target, result, Duration::ZERO)
    }

    pub fn route_delayed(mut self, target: &str, result: Scripted, delay: Duration) -> Self {
        self.routes
            .insert(target.to_string(), Route { result, delay });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests whose path and query start with `target`.
    pub fn hits(&self, target: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| path_and_query(&r.url).starts_with(target))
            .count()
    }
}

fn path_and_query(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme
        .find('/')
        .map_or("/", |index| &without_scheme[index..])
}

#[async_trait]
impl Transport for RoutedTransport {
    fn name(&self) -> &'static str {
        "routed"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let target = path_and_query(&request.url).to_string();
        self.requests.lock().push(request);

        let path = target.split('?').next().unwrap_or_default();
        let route = self
            .routes
            .get(&target)
            .or_else(|| self.routes.get(path))
            .cloned();

        match route {
            Some(Route { result, delay }) => {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                result
            }
            None => Ok(HttpResponse::new(404, r#"{"message":"no route"}"#)),
        }
    }
}
