//! Core KampunG client library (config, session, API, views).

pub mod api;
pub mod config;
pub mod session;
pub mod validation;
pub mod views;

pub use api::{ApiClient, ApiError, ApiErrorKind, ApiResult};
pub use config::Config;
pub use session::{AuthSession, FileSessionStore, MemorySessionStore, SessionStore};
