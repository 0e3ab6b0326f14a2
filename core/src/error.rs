//! Error types for the task API client.
//!
//! # Design
//! Callers branch on the variant instead of matching message strings. The
//! `Http` variant's `Display` is exactly the server-provided message (or the
//! `HTTP <status>` fallback) because that text is what views show the user.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// A success body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("invalid request: {0}")]
    Encode(String),

    /// The durable token store could not be read or written.
    #[error("token storage: {0}")]
    Storage(String),
}

impl ApiError {
    /// Translate a non-2xx response into `ApiError::Http`.
    ///
    /// Uses the body's `error` field when the body is a JSON object carrying a
    /// non-empty string there, otherwise `HTTP <status>`.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));
        ApiError::Http { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_comes_from_error_field() {
        let err = ApiError::from_status(404, r#"{"error":"not found"}"#);
        assert_eq!(err.to_string(), "not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let err = ApiError::from_status(500, "");
        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn unparseable_body_falls_back_to_status() {
        let err = ApiError::from_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn json_without_usable_error_falls_back_to_status() {
        assert_eq!(ApiError::from_status(400, r#"{"message":"nope"}"#).to_string(), "HTTP 400");
        assert_eq!(ApiError::from_status(400, r#"{"error":""}"#).to_string(), "HTTP 400");
        assert_eq!(ApiError::from_status(400, r#"{"error":42}"#).to_string(), "HTTP 400");
        assert_eq!(ApiError::from_status(400, r#"["error"]"#).to_string(), "HTTP 400");
    }

    #[test]
    fn unauthorized_is_detected() {
        let err = ApiError::from_status(401, r#"{"error": "invalid token"}"#);
        assert!(err.is_unauthorized());
        assert!(!err.is_not_found());
    }

    #[test]
    fn non_http_errors_have_no_status() {
        assert_eq!(ApiError::Transport("refused".into()).status(), None);
        assert_eq!(ApiError::Decode("eof".into()).status(), None);
    }
}
