//! `reqwest`-backed [`Transport`].

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use crate::port::outbound::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// Sends requests with a shared `reqwest` client.
///
/// URLs are passed through untouched so query strings keep any characters
/// the caller wrote literally.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: HttpClient::new(),
        }
    }

    #[must_use]
    pub const fn with_client(http: HttpClient) -> Self {
        Self { http }
    }

    fn map_error(err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method, request.url.as_str())
            .timeout(request.timeout);

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| Self::map_error(&e))?;

        Ok(HttpResponse { status, body })
    }
}
