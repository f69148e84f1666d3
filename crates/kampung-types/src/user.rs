use serde::{Deserialize, Serialize};

use crate::Id;

/// Public profile of a user as returned by the `/users` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Id,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
    /// Whether the signed-in user follows this user.
    #[serde(default)]
    pub following: bool,
}

impl UserSummary {
    /// Display name when set and non-blank, else the username.
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    /// Uppercased first letter of the display name, used for avatar placeholders.
    pub fn initial(&self) -> Option<char> {
        self.display_name()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }

    /// Applies the result of a follow toggle.
    pub fn apply_follow(&mut self, status: FollowStatus) {
        self.following = status.following;
        self.followers_count = status.followers_count;
    }
}

/// Result of `POST /users/:id/follow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatus {
    pub following: bool,
    #[serde(default)]
    pub followers_count: u64,
}
