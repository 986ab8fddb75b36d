//! Request signing.
//!
//! The signed message is `"{nonce}:{path}:{body}"` when the body is a
//! non-empty JSON object and `"{nonce}:{path}"` otherwise. The signature is
//! `base64(HMAC-SHA512(secret, SHA-256(message)))`.

use std::fmt;

use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::{Digest, Sha256, Sha512};

use crate::error::ApiError;

type HmacSha512 = Hmac<Sha512>;

/// Signs exchange requests with the shared API secret.
///
/// `Debug` output redacts the secret.
#[derive(Clone)]
pub struct RequestSigner {
    secret: String,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Serialize the body that will be both signed and sent.
    ///
    /// Returns `None` for a missing, `null` or empty-object body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for bodies that are not JSON objects.
    pub fn encode_body(body: Option<&Value>) -> Result<Option<String>, ApiError> {
        match body {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) if map.is_empty() => Ok(None),
            Some(value @ Value::Object(_)) => Ok(Some(value.to_string())),
            Some(_) => Err(ApiError::Validation("request body must be a JSON object".into())),
        }
    }

    /// Build the message string covered by the signature.
    #[must_use]
    pub fn message(nonce: i64, path: &str, encoded_body: Option<&str>) -> String {
        match encoded_body {
            Some(body) => format!("{nonce}:{path}:{body}"),
            None => format!("{nonce}:{path}"),
        }
    }

    /// Sign a request.
    ///
    /// `encoded_body` must be the output of [`Self::encode_body`] so that the
    /// signed bytes match the bytes sent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] if the MAC cannot be keyed.
    pub fn sign(
        &self,
        nonce: i64,
        path: &str,
        encoded_body: Option<&str>,
    ) -> Result<String, ApiError> {
        let message = Self::message(nonce, path, encoded_body);
        let digest = Sha256::digest(message.as_bytes());

        let mut mac = HmacSha512::new_from_slice(self.secret.as_bytes())
            .map_err(|_| ApiError::Validation("invalid signing key".into()))?;
        mac.update(&digest);

        Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signer() -> RequestSigner {
        RequestSigner::new("test-secret")
    }

    #[test]
    fn message_omits_missing_body() {
        assert_eq!(RequestSigner::message(42, "/v1/x", None), "42:/v1/x");
    }

    #[test]
    fn message_appends_encoded_body() {
        assert_eq!(
            RequestSigner::message(42, "/v1/x", Some(r#"{"a":1}"#)),
            r#"42:/v1/x:{"a":1}"#
        );
    }

    #[test]
    fn empty_object_body_is_treated_as_no_body() {
        let empty = json!({});
        let encoded = RequestSigner::encode_body(Some(&empty)).unwrap();
        assert_eq!(encoded, None);

        let with_empty = signer()
            .sign(1_700_000_000_000, "/v1/orders", encoded.as_deref())
            .unwrap();
        let without = signer().sign(1_700_000_000_000, "/v1/orders", None).unwrap();
        assert_eq!(with_empty, without);
    }

    #[test]
    fn null_body_is_treated_as_no_body() {
        assert_eq!(RequestSigner::encode_body(Some(&Value::Null)).unwrap(), None);
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = RequestSigner::encode_body(Some(&json!([1, 2]))).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn different_nonces_produce_different_signatures() {
        let body = RequestSigner::encode_body(Some(&json!({"amount": "1"}))).unwrap();
        let first = signer().sign(1, "/v1/orders", body.as_deref()).unwrap();
        let second = signer().sign(2, "/v1/orders", body.as_deref()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn signing_is_deterministic() {
        let first = signer().sign(7, "/v1/wallet/pockets", None).unwrap();
        let second = signer().sign(7, "/v1/wallet/pockets", None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn signature_depends_on_secret() {
        let other = RequestSigner::new("other-secret");
        assert_ne!(
            signer().sign(7, "/v1/wallet/pockets", None).unwrap(),
            other.sign(7, "/v1/wallet/pockets", None).unwrap()
        );
    }

    #[test]
    fn signature_is_base64_of_sha512_mac() {
        let signature = signer().sign(7, "/v1/wallet/pockets", None).unwrap();
        let raw = base64::engine::general_purpose::STANDARD
            .decode(&signature)
            .unwrap();
        assert_eq!(raw.len(), 64);
    }

    #[test]
    fn signature_matches_manual_construction() {
        let digest = Sha256::digest(b"7:/v1/wallet/pockets");
        let mut mac = HmacSha512::new_from_slice(b"test-secret").unwrap();
        mac.update(&digest);
        let expected =
            base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        assert_eq!(signer().sign(7, "/v1/wallet/pockets", None).unwrap(), expected);
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", signer());
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains("redacted"));
    }
}
