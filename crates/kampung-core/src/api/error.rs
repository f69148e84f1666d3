//! Error classification for API calls.

use std::fmt;

use serde_json::Value;

/// Message used when the request never reached the server.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection.";
/// Message shown after an unauthorized response ends the session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Categories of API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// HTTP 401. The session is stale; the caller decides what to do about it.
    Unauthorized,
    /// Any other non-2xx status
    HttpStatus,
    /// Request or connect timeout
    Timeout,
    /// Connection failure before a response arrived
    Network,
    /// Body could not be decoded into the expected shape
    Parse,
    /// The session store could not be updated
    Storage,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Unauthorized => write!(f, "unauthorized"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Parse => write!(f, "parse"),
            ApiErrorKind::Storage => write!(f, "storage"),
        }
    }
}

/// Structured failure from an API call.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status when a response was received
    pub status: Option<u16>,
    /// Whether `message` came from the server body
    pub server_message: bool,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            server_message: false,
            details: None,
        }
    }

    /// Builds an error from a non-2xx response.
    ///
    /// Prefers a `message` field from a JSON body, then an `error` string or
    /// `error.message`.
    pub fn http_status(status: u16, body: &str) -> Self {
        let kind = if status == 401 {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::HttpStatus
        };
        let details = (!body.is_empty()).then(|| body.to_string());
        match extract_server_message(body) {
            Some(message) => Self {
                kind,
                message,
                status: Some(status),
                server_message: true,
                details,
            },
            None => Self {
                kind,
                message: format!("HTTP {status}"),
                status: Some(status),
                server_message: false,
                details,
            },
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, message)
    }

    pub fn network(details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(ApiErrorKind::Network, NETWORK_ERROR_MESSAGE)
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }

    pub fn storage(err: &anyhow::Error) -> Self {
        Self::new(ApiErrorKind::Storage, format!("{err:#}"))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// The server-provided message when there is one, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if self.server_message {
            self.message.clone()
        } else {
            fallback.to_string()
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

fn extract_server_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let candidate = json
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| json.get("error").and_then(Value::as_str))
        .or_else(|| {
            json.get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
        })?;
    let trimmed = candidate.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_401_is_unauthorized() {
        let err = ApiError::http_status(401, "");
        assert!(err.is_unauthorized());
        assert_eq!(err.message, "HTTP 401");
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_server_message_is_preferred() {
        let err = ApiError::http_status(409, r#"{"success":false,"message":"Username taken"}"#);
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.status, Some(409));
        assert_eq!(err.user_message("Registration failed"), "Username taken");
    }

    #[test]
    fn test_nested_error_message() {
        let err = ApiError::http_status(500, r#"{"error":{"message":"boom"}}"#);
        assert_eq!(err.message, "boom");
        let err = ApiError::http_status(400, r#"{"error":"bad input"}"#);
        assert_eq!(err.message, "bad input");
    }

    #[test]
    fn test_non_json_body_falls_back_to_status() {
        let err = ApiError::http_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("<html>Bad Gateway</html>"));
    }

    #[test]
    fn test_network_error_uses_fixed_message() {
        let err = ApiError::network("connection refused");
        assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
        assert_eq!(err.user_message("Failed"), "Failed");
    }
}
