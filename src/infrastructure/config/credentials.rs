//! API credentials for request signing.

use std::fmt;

use crate::error::{ConfigError, Result};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "EXCHANGE_API_KEY";

/// Environment variable holding the API secret.
pub const API_SECRET_ENV: &str = "EXCHANGE_API_SECRET";

/// API key and secret.
///
/// Loaded from the environment at runtime, never from the config file.
/// `Debug` output redacts both values.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Read credentials from `EXCHANGE_API_KEY` and `EXCHANGE_API_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first variable that is
    /// unset or blank.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        let api_key = read_env(API_KEY_ENV)?;
        let api_secret = read_env(API_SECRET_ENV)?;
        Ok(Self::new(api_key, api_secret))
    }
}

fn read_env(field: &'static str) -> Result<String> {
    match std::env::var(field) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingField { field }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_secrets() {
        let credentials = Credentials::new("key-123", "secret-456");
        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("key-123"));
        assert!(!rendered.contains("secret-456"));
    }
}
