//! Error types for the BlockScore client.
//!
//! # Design
//! Each failure source gets its own variant so callers can match on it
//! without inspecting messages. A non-success status always lands in `Api`,
//! carrying the numeric status next to whatever part of the service's error
//! envelope could be decoded. 4xx and 5xx are not split into separate
//! variants; callers branch on `ApiError::status`.

use std::fmt;

/// Errors returned by every `Client` operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client is not usable as configured: blank key, zero version,
    /// malformed base URL, or an unreadable environment.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// DNS, connect, TLS or read failure. Never retried.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a status other than 200 or 201.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success body did not match the expected response shape.
    #[error("decode error: {0}")]
    Decode(String),
}

impl Error {
    /// The structured service error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Decoded representation of a non-success response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub param: String,
    pub type_: String,
}

impl ApiError {
    /// Decode the `{"error": {...}}` envelope from `body`.
    ///
    /// Best effort: each detail field is read independently, so a body with a
    /// partial or oddly-typed envelope still yields the fields that were
    /// present. A body that is not JSON at all yields only the status.
    pub fn from_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("error").cloned())
            .map(ErrorDetail::from_value)
            .unwrap_or_default();

        Self {
            status,
            code: detail.code,
            message: detail.message,
            param: detail.param,
            type_: detail.type_,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "BlockScore API returned status {}", self.status)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Default)]
struct ErrorDetail {
    code: String,
    message: String,
    param: String,
    type_: String,
}

impl ErrorDetail {
    fn from_value(value: serde_json::Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            code: field("code"),
            message: field("message"),
            param: field("param"),
            type_: field("type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_envelope() {
        let body = r#"{"error":{"code":"insufficient_funds","message":"Payment required","param":"","type":"billing_error"}}"#;
        let err = ApiError::from_body(402, body);
        assert_eq!(err.status, 402);
        assert_eq!(err.code, "insufficient_funds");
        assert_eq!(err.message, "Payment required");
        assert_eq!(err.type_, "billing_error");
        assert_eq!(err.to_string(), "Payment required");
    }

    #[test]
    fn partial_envelope_keeps_decodable_fields() {
        let body = r#"{"error":{"code":"invalid","message":"Bad thing","param":7}}"#;
        let err = ApiError::from_body(400, body);
        assert_eq!(err.code, "invalid");
        assert_eq!(err.message, "Bad thing");
        assert_eq!(err.param, "");
    }

    #[test]
    fn non_json_body_keeps_status_only() {
        let err = ApiError::from_body(502, "<html>Bad Gateway</html>");
        assert_eq!(err.status, 502);
        assert!(err.message.is_empty());
        assert_eq!(err.to_string(), "BlockScore API returned status 502");
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }

    #[test]
    fn api_variant_displays_service_message() {
        let err = Error::from(ApiError::from_body(
            404,
            r#"{"error":{"message":"Not found"}}"#,
        ));
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.api_error().map(|e| e.status), Some(404));
    }
}
