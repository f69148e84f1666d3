//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod posts;
mod render;
pub mod users;

use anyhow::{Result, bail};
use kampung_core::AuthSession;
use kampung_types::UserSummary;

/// The signed-in user, or an error telling the caller to log in.
fn require_login(session: &AuthSession) -> Result<UserSummary> {
    match session.current_user() {
        Some(user) => Ok(user),
        None => bail!("Not logged in. Run `kampung login` first."),
    }
}
