use serde::{Deserialize, Serialize};

use crate::Id;

/// A short text update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id,
    pub user_id: Id,
    /// Author username; empty when the server omits it.
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    /// Server timestamp, kept verbatim and parsed on display.
    #[serde(default)]
    pub created_at: String,
    /// Ids of users who liked the post.
    #[serde(default)]
    pub likes: Vec<Id>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub comments_count: u64,
}

impl Post {
    pub fn is_liked_by(&self, user_id: &Id) -> bool {
        self.likes.contains(user_id)
    }
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewPost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
}
