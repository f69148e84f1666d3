use kampung_types::{FollowStatus, Id, UserSummary};

use super::error::ApiResult;
use super::transport::HttpClient;

/// `/users` endpoints.
pub struct UsersApi<'a> {
    http: &'a HttpClient,
}

impl<'a> UsersApi<'a> {
    pub(super) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn me(&self) -> ApiResult<UserSummary> {
        self.http.get("/users/me").await
    }

    pub async fn by_id(&self, user_id: &Id) -> ApiResult<UserSummary> {
        self.http.get(&format!("/users/{user_id}")).await
    }

    /// Toggles following `user_id` and returns the new relationship.
    pub async fn follow(&self, user_id: &Id) -> ApiResult<FollowStatus> {
        self.http.post_empty(&format!("/users/{user_id}/follow")).await
    }

    pub async fn followers(&self, user_id: &Id) -> ApiResult<Vec<UserSummary>> {
        self.http.get(&format!("/users/{user_id}/followers")).await
    }

    pub async fn following(&self, user_id: &Id) -> ApiResult<Vec<UserSummary>> {
        self.http.get(&format!("/users/{user_id}/following")).await
    }

    /// `GET /users/search?q=`. A blank query returns no users without a request.
    pub async fn search(&self, query: &str) -> ApiResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.http
            .get_with_query("/users/search", &[("q", query)])
            .await
    }
}
