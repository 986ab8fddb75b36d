use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Classified failures of a single logical exchange call.
///
/// Messages carry the upstream `message` field when the exchange sent one.
/// Credentials are never part of any variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Bad caller input, rejected before anything is sent upstream.
    #[error("validation failed: {0}")]
    Validation(String),

    /// HTTP 401 or 403.
    #[error("authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// HTTP 400.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// HTTP 404.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// HTTP 429 that persisted through every retry.
    #[error("rate limited after {attempts} attempts: {message}")]
    RateLimit { attempts: u32, message: String },

    /// Any other status, or a network failure (`status` is `None`).
    #[error("upstream error{}: {message}", status_suffix(.status))]
    Upstream { status: Option<u16>, message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl ApiError {
    /// Short machine-readable tag used in structured failure payloads.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Authentication { .. } => "authentication",
            Self::BadRequest { .. } => "bad_request",
            Self::NotFound { .. } => "not_found",
            Self::RateLimit { .. } => "rate_limit",
            Self::Upstream { .. } => "upstream",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("valuation failed: {0}")]
    Valuation(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short machine-readable tag used in structured failure payloads.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Api(err) => err.kind(),
            Self::Valuation(_) => "valuation",
            Self::Json(_) => "json",
            Self::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_display_includes_status_when_known() {
        let err = ApiError::Upstream {
            status: Some(502),
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "upstream error (502): bad gateway");
    }

    #[test]
    fn upstream_display_omits_status_for_network_failures() {
        let err = ApiError::Upstream {
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "upstream error: connection refused");
    }

    #[test]
    fn kind_passes_through_api_errors() {
        let err: Error = ApiError::NotFound {
            message: "no such pair".into(),
        }
        .into();
        assert_eq!(err.kind(), "not_found");
    }
}
