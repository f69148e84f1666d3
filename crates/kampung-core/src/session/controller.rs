//! Auth session controller.
//!
//! `AuthSession` is the one owner of the signed-in identity for a client run.
//! It mirrors the persisted session into memory, publishes changes over a
//! `watch` channel, and is the only place that reacts to an unauthorized
//! response: views route their calls through [`AuthSession::run`].

use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

use kampung_types::{Credentials, UserSummary};
use serde_json::Value;
use tokio::sync::watch;

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::validation::{RegistrationForm, ValidationError};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// Persisted session not yet read
    Initializing,
    Ready,
}

/// Snapshot published to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub user: Option<UserSummary>,
    /// Set when the server rejected the session; front ends should send the
    /// user to the login screen. Cleared by the next login.
    pub expired: bool,
}

impl AuthState {
    fn initializing() -> Self {
        Self {
            phase: AuthPhase::Initializing,
            user: None,
            expired: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == AuthPhase::Initializing
    }
}

/// Why a login or registration did not go through.
#[derive(Debug, Clone)]
pub enum AuthFailure {
    /// Rejected locally; no request was sent.
    Invalid(ValidationError),
    /// The request failed. `message` is what the user should see.
    Request { message: String, error: ApiError },
}

impl AuthFailure {
    pub fn message(&self) -> String {
        match self {
            AuthFailure::Invalid(err) => err.to_string(),
            AuthFailure::Request { message, .. } => message.clone(),
        }
    }

    fn request(error: ApiError, fallback: &str) -> Self {
        Self::Request {
            message: error.user_message(fallback),
            error,
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for AuthFailure {}

/// Explicit session context handed to every view.
#[derive(Clone)]
pub struct AuthSession {
    api: ApiClient,
    state: Arc<watch::Sender<AuthState>>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("api", &self.api)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl AuthSession {
    /// Creates a controller in the `Initializing` phase.
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(AuthState::initializing());
        Self {
            api,
            state: Arc::new(state),
        }
    }

    /// Creates a controller and immediately restores the persisted session.
    pub fn restore(api: ApiClient) -> Self {
        let session = Self::new(api);
        session.hydrate();
        session
    }

    /// Reads the persisted session and moves to `Ready`, whatever the outcome.
    ///
    /// A user is restored only when both a token and a user record exist. A
    /// record that does not decode is discarded together with the token.
    pub fn hydrate(&self) {
        let auth = self.api.auth();
        let has_token = auth.is_authenticated();
        let user = match auth.current_user() {
            Ok(Some(user)) if has_token => Some(user),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("Error loading cached session: {err}; clearing it");
                if let Err(err) = auth.logout() {
                    tracing::warn!("Failed to clear corrupted session: {err}");
                }
                None
            }
        };
        tracing::debug!(
            has_token,
            restored = user.is_some(),
            "auth session initialized"
        );
        self.state.send_modify(|state| {
            state.phase = AuthPhase::Ready;
            state.user = user;
        });
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_user(&self) -> Option<UserSummary> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Logs in and adopts the server-returned user.
    ///
    /// When the login body carries no user, `/users/me` supplies it. On any
    /// failure the in-memory state is left as it was, except that a 401 ends
    /// the session like any other call.
    ///
    /// # Errors
    /// `AuthFailure::Request` with the server message or "Login failed".
    pub async fn login(&self, credentials: &Credentials) -> Result<UserSummary, AuthFailure> {
        let data = self
            .api
            .auth()
            .login(credentials)
            .await
            .map_err(|err| self.reject(err, LOGIN_FAILED))?;

        let user = match data.user {
            Some(user) => user,
            None => {
                let fetched = self
                    .api
                    .users()
                    .me()
                    .await
                    .and_then(|user| self.api.auth().cache_user(&user).map(|()| user));
                match fetched {
                    Ok(user) => user,
                    Err(err) => {
                        if let Err(clear_err) = self.api.auth().logout() {
                            tracing::warn!("Failed to clear partial session: {clear_err}");
                        }
                        return Err(self.reject(err, LOGIN_FAILED));
                    }
                }
            }
        };

        tracing::info!(username = %user.username, "logged in");
        self.state.send_modify(|state| {
            state.phase = AuthPhase::Ready;
            state.user = Some(user.clone());
            state.expired = false;
        });
        Ok(user)
    }

    /// Validates the form locally, then registers. The session is untouched
    /// unless the server answers 401; the user logs in separately afterwards.
    ///
    /// # Errors
    /// `AuthFailure::Invalid` before any request, or `AuthFailure::Request`
    /// with the server message or "Registration failed".
    pub async fn register(&self, form: &RegistrationForm) -> Result<Value, AuthFailure> {
        let registration = form.validate().map_err(AuthFailure::Invalid)?;
        self.api
            .auth()
            .register(&registration)
            .await
            .map_err(|err| self.reject(err, REGISTRATION_FAILED))
    }

    /// Clears the persisted session and the current user. No server call.
    pub fn logout(&self) {
        if let Err(err) = self.api.auth().logout() {
            tracing::warn!("Failed to clear session: {err}");
        }
        tracing::info!("logged out");
        self.state.send_modify(|state| {
            state.phase = AuthPhase::Ready;
            state.user = None;
        });
    }

    /// Awaits an API call and ends the session if the server answered 401.
    ///
    /// # Errors
    /// Returns the call's error unchanged.
    pub async fn run<T, F>(&self, call: F) -> ApiResult<T>
    where
        F: IntoFuture<Output = ApiResult<T>>,
    {
        let result = call.await;
        if let Err(err) = &result
            && err.is_unauthorized()
        {
            self.expire();
        }
        result
    }

    /// Returns whether the session expired since the last call, and resets the flag.
    pub fn take_expired(&self) -> bool {
        let mut expired = false;
        self.state.send_if_modified(|state| {
            expired = state.expired;
            state.expired = false;
            expired
        });
        expired
    }

    fn reject(&self, error: ApiError, fallback: &str) -> AuthFailure {
        if error.is_unauthorized() {
            self.expire();
        }
        AuthFailure::request(error, fallback)
    }

    fn expire(&self) {
        tracing::warn!("server rejected the session; clearing it");
        if let Err(err) = self.api.auth().logout() {
            tracing::warn!("Failed to clear rejected session: {err}");
        }
        self.state.send_modify(|state| {
            state.phase = AuthPhase::Ready;
            state.user = None;
            state.expired = true;
        });
    }
}
