//! Handler for the `request` command.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use super::command::RequestArgs;
use crate::adapter::outbound::exchange::ExchangeClient;
use crate::error::{ApiError, Result};

/// Parse an HTTP method name, case-insensitively.
fn parse_method(raw: &str) -> Result<Method> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|_| ApiError::Validation(format!("invalid HTTP method: {raw}")).into())
}

/// Execute the request command.
pub async fn execute(client: &ExchangeClient, args: &RequestArgs) -> Result<Value> {
    let method = parse_method(&args.method)?;
    let body: Option<Value> = args.body.as_deref().map(serde_json::from_str).transpose()?;

    let value = client
        .request(
            method,
            &args.path,
            &args.params,
            body.as_ref(),
            args.timeout_ms.map(Duration::from_millis),
        )
        .await?;
    Ok(value)
}
