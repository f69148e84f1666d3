use kampung_types::{Credentials, LoginData, LoginResponse, Registration, UserSummary};
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::transport::HttpClient;
use crate::session::keys;

/// `/auth` endpoints plus the local session helpers.
pub struct AuthApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AuthApi<'a> {
    pub(super) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// `POST /auth/register`. Does not touch the stored session.
    pub async fn register(&self, registration: &Registration) -> ApiResult<Value> {
        self.http.post("/auth/register", registration).await
    }

    /// `POST /auth/login`, then persists the token and the user.
    ///
    /// Without a user in the body the cached user is removed. If the user
    /// cannot be written, the token is dropped again.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginData> {
        let raw = self.http.post_raw("/auth/login", credentials).await?;
        let body: Value = serde_json::from_str(&raw).map_err(|err| ApiError {
            details: Some(raw.clone()),
            ..ApiError::parse(format!("Failed to decode login response: {err}"))
        })?;

        let response =
            LoginResponse::decode(&body).map_err(|err| ApiError::parse(err.to_string()))?;
        match &response {
            LoginResponse::Enveloped(_) => tracing::debug!("login response used envelope shape"),
            LoginResponse::Bare(_) => tracing::debug!("login response used bare shape"),
        }
        let data = response.into_data();

        let store = self.http.store();
        store
            .set(keys::ACCESS_TOKEN, &data.token)
            .map_err(|err| ApiError::storage(&err))?;
        // A user record from an earlier login must not sit next to the new token.
        let cached = match &data.user {
            Some(user) => self.cache_user(user),
            None => store.remove(keys::USER).map_err(|err| ApiError::storage(&err)),
        };
        if let Err(err) = cached {
            if let Err(clear_err) = store.remove(keys::ACCESS_TOKEN) {
                tracing::warn!("Failed to drop token after partial login: {clear_err}");
            }
            return Err(err);
        }
        Ok(data)
    }

    /// Clears the stored session. No server call.
    pub fn logout(&self) -> ApiResult<()> {
        self.http
            .store()
            .clear_session()
            .map_err(|err| ApiError::storage(&err))
    }

    /// The cached user record, if any.
    ///
    /// # Errors
    /// A `Parse` error when the cached record is not a valid user.
    pub fn current_user(&self) -> ApiResult<Option<UserSummary>> {
        let Some(raw) = self.http.store().get(keys::USER) else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| ApiError::parse(format!("Cached user is corrupted: {err}")))
    }

    /// Token presence check only; validity is decided by the server.
    pub fn is_authenticated(&self) -> bool {
        self.http.store().access_token().is_some()
    }

    /// Writes `user` to the session cache.
    pub fn cache_user(&self, user: &UserSummary) -> ApiResult<()> {
        let json = serde_json::to_string(user)
            .map_err(|err| ApiError::parse(format!("Failed to encode user: {err}")))?;
        self.http
            .store()
            .set(keys::USER, &json)
            .map_err(|err| ApiError::storage(&err))
    }
}
