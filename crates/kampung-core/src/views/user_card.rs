use kampung_types::{FollowStatus, UserSummary};

use crate::api::ApiResult;
use crate::session::AuthSession;

/// A user row with its own follow button.
///
/// `following` and the follower count mirror the server's last follow
/// response and are never guessed locally.
#[derive(Debug, Clone)]
pub struct UserCard {
    pub user: UserSummary,
    pub busy: bool,
}

impl UserCard {
    pub fn new(user: UserSummary) -> Self {
        Self { user, busy: false }
    }

    pub fn display_name(&self) -> &str {
        self.user.display_name()
    }

    pub fn initial(&self) -> char {
        self.user.initial().unwrap_or('U')
    }

    pub fn following(&self) -> bool {
        self.user.following
    }

    pub fn followers_count(&self) -> u64 {
        self.user.followers_count
    }

    /// Toggles following and adopts the server's answer.
    ///
    /// # Errors
    /// The request error; the card is left unchanged.
    pub async fn toggle_follow(&mut self, session: &AuthSession) -> ApiResult<FollowStatus> {
        self.busy = true;
        let result = session.run(session.api().users().follow(&self.user.id)).await;
        self.busy = false;
        let status = result?;
        self.user.apply_follow(status);
        Ok(status)
    }
}
