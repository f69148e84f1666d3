use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::UserSummary;

/// Body of `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /auth/register`. The confirmation password never leaves the client.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token and identity carried by a successful login.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginData {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// The login endpoint answers in one of two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginResponse {
    /// `{ "success": true, "data": { "token": ..., "user": ... } }`
    Enveloped(LoginData),
    /// `{ "token": ..., "user": ... }`
    Bare(LoginData),
}

/// The login body matched neither accepted shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginShapeError {
    pub reason: String,
}

impl fmt::Display for LoginShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unrecognized login response: {}", self.reason)
    }
}

impl std::error::Error for LoginShapeError {}

impl LoginResponse {
    /// Classifies a decoded login body.
    ///
    /// An envelope is recognised by an object-valued `data` field, a bare
    /// payload by a top-level `token`. Anything else, including an envelope
    /// with `success: false`, is rejected.
    ///
    /// # Errors
    /// Returns `LoginShapeError` when the body matches neither shape or the
    /// matched shape is missing a usable token.
    pub fn decode(body: &Value) -> Result<Self, LoginShapeError> {
        let shape_error = |reason: &str| LoginShapeError {
            reason: reason.to_string(),
        };

        let Some(object) = body.as_object() else {
            return Err(shape_error("body is not a JSON object"));
        };

        match (object.get("data"), object.get("token")) {
            (Some(data @ Value::Object(_)), _) => {
                if object.get("success").and_then(Value::as_bool) != Some(true) {
                    return Err(shape_error("envelope is not marked successful"));
                }
                Self::decode_data(data).map(Self::Enveloped)
            }
            (_, Some(Value::String(_))) => Self::decode_data(body).map(Self::Bare),
            _ => Err(shape_error("expected `data` envelope or top-level `token`")),
        }
    }

    fn decode_data(value: &Value) -> Result<LoginData, LoginShapeError> {
        let data = LoginData::deserialize(value).map_err(|err| LoginShapeError {
            reason: err.to_string(),
        })?;
        if data.token.trim().is_empty() {
            return Err(LoginShapeError {
                reason: "token is empty".to_string(),
            });
        }
        Ok(data)
    }

    pub fn data(&self) -> &LoginData {
        match self {
            LoginResponse::Enveloped(data) | LoginResponse::Bare(data) => data,
        }
    }

    pub fn into_data(self) -> LoginData {
        match self {
            LoginResponse::Enveloped(data) | LoginResponse::Bare(data) => data,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Id;

    #[test]
    fn test_decode_enveloped_shape() {
        let body = json!({
            "success": true,
            "data": { "token": "t1", "user": { "id": 1, "username": "alice" } }
        });
        let response = LoginResponse::decode(&body).unwrap();
        assert!(matches!(response, LoginResponse::Enveloped(_)));
        let data = response.into_data();
        assert_eq!(data.token, "t1");
        assert_eq!(data.user.unwrap().id, Id::Num(1));
    }

    #[test]
    fn test_decode_bare_shape_without_user() {
        let body = json!({ "token": "t2" });
        let response = LoginResponse::decode(&body).unwrap();
        assert!(matches!(response, LoginResponse::Bare(_)));
        assert!(response.data().user.is_none());
    }

    #[test]
    fn test_decode_rejects_unknown_shape() {
        let err = LoginResponse::decode(&json!({ "message": "ok" })).unwrap_err();
        assert!(err.to_string().starts_with("Unrecognized login response"));
    }

    #[test]
    fn test_decode_rejects_failed_envelope() {
        let body = json!({ "success": false, "data": { "token": "t1" } });
        assert!(LoginResponse::decode(&body).is_err());
    }

    #[test]
    fn test_decode_rejects_empty_token() {
        assert!(LoginResponse::decode(&json!({ "token": "  " })).is_err());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("alice", "secret12"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret12"));
    }
}
