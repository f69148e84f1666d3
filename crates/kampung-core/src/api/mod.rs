//! Typed access to the KampunG HTTP API.
//!
//! `ApiClient` owns the transport and hands out one facade per resource.
//! Every facade method maps to exactly one HTTP call (or none, for the
//! local-only auth helpers).

mod auth;
mod error;
mod posts;
mod transport;
mod users;

use std::sync::Arc;

use anyhow::Result;

pub use auth::AuthApi;
pub use error::{ApiError, ApiErrorKind, ApiResult, NETWORK_ERROR_MESSAGE, SESSION_EXPIRED_MESSAGE};
pub use posts::PostsApi;
pub use transport::{HttpClient, USER_AGENT};
pub use users::UsersApi;

use crate::config::Config;
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Builds a client for the configured origin and timeout.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &Config, store: Arc<dyn SessionStore>) -> Result<Self> {
        let base_url = config.resolve_base_url()?;
        let http = HttpClient::new(&base_url, config.timeout(), store)?;
        Ok(Self::new(http))
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.http)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.http)
    }

    pub fn posts(&self) -> PostsApi<'_> {
        PostsApi::new(&self.http)
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        self.http.store()
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }
}
