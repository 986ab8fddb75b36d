//! HTTP transport port.
//!
//! The exchange client builds fully signed requests and hands them to a
//! [`Transport`] for delivery. Production uses the `reqwest` adapter; tests
//! substitute scripted transports.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use thiserror::Error;

/// A request ready to put on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL including any query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Value of the first header named `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Failure to obtain any response at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

/// Delivers HTTP requests.
///
/// Implementations must be thread-safe (`Send + Sync`) so one client can be
/// shared across concurrent fan-out branches.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Return the transport name for logging.
    fn name(&self) -> &'static str;

    /// Send one request and return whatever status the server answered with.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] only when no HTTP response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
