//! Authenticated exchange REST client.
//!
//! Every logical call is signed, bounded by a per-attempt timeout, retried on
//! HTTP 429 and transient network failures, and classified into an
//! [`ApiError`] when it finally fails. All log lines of one call share a
//! correlation id.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use super::nonce::NonceSource;
use super::retry::{AttemptOutcome, CallState, RetryPolicy};
use super::signer::RequestSigner;
use crate::adapter::outbound::http::ReqwestTransport;
use crate::application::cache::{CacheCategory, ResponseCache};
use crate::error::ApiError;
use crate::infrastructure::config::{Credentials, GatewayConfig};
use crate::port::outbound::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the decimal millisecond nonce.
pub const NONCE_HEADER: &str = "x-nonce";
/// Header carrying the base64 signature.
pub const SIGNATURE_HEADER: &str = "api-signature";

/// Longest slice of a non-JSON error body copied into an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Why one attempt did not produce a value.
#[derive(Debug)]
enum AttemptFailure {
    /// Fully classified, never retried.
    Rejected(ApiError),
    /// HTTP 429.
    Throttled { message: String },
    /// No HTTP response at all.
    Network(TransportError),
}

impl AttemptFailure {
    fn outcome(&self) -> AttemptOutcome {
        match self {
            Self::Rejected(_) => AttemptOutcome::Terminal,
            Self::Throttled { .. } => AttemptOutcome::Retryable,
            Self::Network(err) if err.is_transient() => AttemptOutcome::Retryable,
            Self::Network(_) => AttemptOutcome::Terminal,
        }
    }

    fn into_error(self, attempts: u32) -> ApiError {
        match self {
            Self::Rejected(err) => err,
            Self::Throttled { message } => ApiError::RateLimit { attempts, message },
            Self::Network(err) => ApiError::Upstream {
                status: None,
                message: err.to_string(),
            },
        }
    }
}

/// Map a non-success, non-429 status to its error class.
#[must_use]
pub fn classify_status(status: u16, message: String) -> ApiError {
    match status {
        400 => ApiError::BadRequest { message },
        401 | 403 => ApiError::Authentication { status, message },
        404 => ApiError::NotFound { message },
        _ => ApiError::Upstream {
            status: Some(status),
            message,
        },
    }
}

/// Serialize query parameters as literal `k=v` pairs joined by `&`.
///
/// No percent-encoding is applied; some endpoints need characters such as
/// brackets to arrive verbatim.
#[must_use]
pub fn build_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Pull a human-readable message out of an error response body.
fn upstream_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = map.get("message") {
            return message.clone();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("no message")
            .to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}

/// Authenticated client for the exchange REST gateway.
pub struct ExchangeClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_key: String,
    signer: RequestSigner,
    nonces: NonceSource,
    policy: RetryPolicy,
    default_timeout: Duration,
}

impl std::fmt::Debug for ExchangeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeClient")
            .field("transport", &self.transport.name())
            .field("base_url", &self.base_url)
            .field("policy", &self.policy)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl ExchangeClient {
    /// Create a client over an explicit transport.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
        credentials: &Credentials,
        policy: RetryPolicy,
        default_timeout: Duration,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
            signer: RequestSigner::new(credentials.api_secret.clone()),
            nonces: NonceSource::new(),
            policy,
            default_timeout,
        }
    }

    /// Create a `reqwest`-backed client from gateway settings.
    #[must_use]
    pub fn from_config(config: &GatewayConfig, credentials: &Credentials) -> Self {
        Self::new(
            Arc::new(ReqwestTransport::new()),
            config.base_url.clone(),
            credentials,
            RetryPolicy::from_config(config),
            Duration::from_millis(config.timeout_ms),
        )
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Full URL for `path` with `params` appended verbatim.
    #[must_use]
    pub fn build_url(&self, path: &str, params: &[(String, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if !params.is_empty() {
            url.push(if path.contains('?') { '&' } else { '?' });
            url.push_str(&build_query(params));
        }
        url
    }

    /// Perform one logical authenticated call.
    ///
    /// `timeout` bounds each attempt, not the whole call; `None` uses the
    /// configured default.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for non-object bodies without sending
    /// anything, and the classified upstream error once retries are exhausted
    /// or a non-retryable status is received.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        body: Option<&Value>,
        timeout: Option<Duration>,
    ) -> Result<Value, ApiError> {
        let encoded_body = RequestSigner::encode_body(body)?;
        let correlation_id = Uuid::new_v4();
        let span = info_span!(
            "exchange_request",
            %correlation_id,
            method = %method,
            path = %path,
        );

        self.run(
            method,
            path,
            params,
            encoded_body,
            timeout.unwrap_or(self.default_timeout),
        )
        .instrument(span)
        .await
    }

    /// Signed GET with the default timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, ApiError> {
        self.request(Method::GET, path, params, None, None).await
    }

    /// GET through `cache`, keyed by `path?query`.
    ///
    /// Only successful responses are stored.
    ///
    /// # Errors
    ///
    /// See [`Self::request`].
    pub async fn get_cached(
        &self,
        cache: &ResponseCache,
        path: &str,
        params: &[(String, String)],
        category: CacheCategory,
    ) -> Result<Value, ApiError> {
        let key = if params.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", build_query(params))
        };

        if let Some(value) = cache.get(&key) {
            debug!(key = %key, "Cache hit");
            return Ok(value);
        }

        let value = self.get(path, params).await?;
        cache.set(&key, value.clone(), category, None);
        Ok(value)
    }

    async fn run(
        &self,
        method: Method,
        path: &str,
        params: &[(String, String)],
        encoded_body: Option<String>,
        attempt_timeout: Duration,
    ) -> Result<Value, ApiError> {
        let url = self.build_url(path, params);
        let mut state = CallState::Idle.advance();
        let mut attempts = 0;
        let mut last: Result<Value, AttemptFailure> = Err(AttemptFailure::Rejected(
            ApiError::Validation("no attempt was made".into()),
        ));

        while !state.is_finished() {
            state = match state {
                CallState::Attempting { attempt } => {
                    attempts += 1;
                    let body = encoded_body.as_deref();
                    last = self
                        .attempt(&method, &url, path, body, attempt, attempt_timeout)
                        .await;
                    let outcome = match &last {
                        Ok(_) => AttemptOutcome::Success,
                        Err(failure) => failure.outcome(),
                    };
                    self.policy.next_state(attempt, outcome, self.policy.jitter())
                }
                CallState::BackoffWait { attempt, delay } => {
                    let reason = match &last {
                        Err(AttemptFailure::Throttled { .. }) => "rate limited",
                        _ => "transient network failure",
                    };
                    warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts(),
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        reason,
                        "Request failed, retrying"
                    );
                    sleep(delay).await;
                    state.advance()
                }
                other => other.advance(),
            };
        }

        match last {
            Ok(value) => Ok(value),
            Err(failure) => {
                let err = failure.into_error(attempts);
                warn!(attempts, kind = err.kind(), error = %err, "Request failed");
                Err(err)
            }
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        path: &str,
        encoded_body: Option<&str>,
        attempt: u32,
        attempt_timeout: Duration,
    ) -> Result<Value, AttemptFailure> {
        let nonce = self.nonces.next();
        let signature = self
            .signer
            .sign(nonce, path, encoded_body)
            .map_err(AttemptFailure::Rejected)?;

        let mut headers = vec![
            (API_KEY_HEADER.to_string(), self.api_key.clone()),
            (NONCE_HEADER.to_string(), nonce.to_string()),
            (SIGNATURE_HEADER.to_string(), signature),
        ];
        if encoded_body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let request = HttpRequest {
            method: method.clone(),
            url: url.to_string(),
            headers,
            body: encoded_body.map(str::to_string),
            timeout: attempt_timeout,
        };

        debug!(attempt, nonce, "Sending request");
        let started = Instant::now();
        let response = match timeout(attempt_timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                debug!(attempt, error = %err, "No response");
                return Err(AttemptFailure::Network(err));
            }
            Err(_) => {
                debug!(
                    attempt,
                    timeout_ms = attempt_timeout.as_millis() as u64,
                    "Attempt timed out"
                );
                return Err(AttemptFailure::Network(TransportError::Timeout(format!(
                    "no response within {} ms",
                    attempt_timeout.as_millis()
                ))));
            }
        };

        debug!(
            attempt,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Received response"
        );
        Self::interpret(response)
    }

    fn interpret(response: HttpResponse) -> Result<Value, AttemptFailure> {
        let HttpResponse { status, body } = response;

        if (200..300).contains(&status) {
            if body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&body).map_err(|e| {
                AttemptFailure::Rejected(ApiError::Upstream {
                    status: Some(status),
                    message: format!("invalid JSON in response: {e}"),
                })
            });
        }

        let message = upstream_message(status, &body);
        if status == 429 {
            return Err(AttemptFailure::Throttled { message });
        }
        Err(AttemptFailure::Rejected(classify_status(status, message)))
    }
}
