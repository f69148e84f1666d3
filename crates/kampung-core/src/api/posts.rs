use kampung_types::{Id, NewPost, Post};

use super::error::ApiResult;
use super::transport::HttpClient;

/// `/posts` endpoints.
pub struct PostsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> PostsApi<'a> {
    pub(super) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn all(&self) -> ApiResult<Vec<Post>> {
        self.http.get("/posts").await
    }

    /// Posts from followed users.
    pub async fn feed(&self) -> ApiResult<Vec<Post>> {
        self.http.get("/posts/feed").await
    }

    pub async fn create(&self, post: &NewPost) -> ApiResult<Post> {
        self.http.post("/posts", post).await
    }

    pub async fn by_id(&self, post_id: &Id) -> ApiResult<Post> {
        self.http.get(&format!("/posts/{post_id}")).await
    }

    pub async fn delete(&self, post_id: &Id) -> ApiResult<()> {
        self.http.delete(&format!("/posts/{post_id}")).await
    }

    /// Toggles the caller's like and returns the updated post.
    pub async fn like(&self, post_id: &Id) -> ApiResult<Post> {
        self.http.post_empty(&format!("/posts/{post_id}/like")).await
    }

    pub async fn by_user(&self, user_id: &Id) -> ApiResult<Vec<Post>> {
        self.http.get(&format!("/posts/user/{user_id}")).await
    }
}
