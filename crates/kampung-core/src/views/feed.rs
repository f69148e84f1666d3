use kampung_types::{Id, Post};

use crate::api::ApiResult;
use crate::session::AuthSession;

use super::post_card::PostCard;

pub const LOAD_POSTS_FAILED: &str = "Failed to load posts";

/// Which timeline the feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedSource {
    /// Every post (`GET /posts`)
    #[default]
    All,
    /// Posts from followed users (`GET /posts/feed`)
    Following,
}

/// Home timeline.
#[derive(Debug, Default)]
pub struct FeedView {
    source: FeedSource,
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
}

impl FeedView {
    pub fn new(source: FeedSource) -> Self {
        Self {
            source,
            ..Self::default()
        }
    }

    pub fn source(&self) -> FeedSource {
        self.source
    }

    pub async fn load(&mut self, session: &AuthSession) {
        self.loading = true;
        self.error = None;
        let posts = session.api().posts();
        let result = match self.source {
            FeedSource::All => session.run(posts.all()).await,
            FeedSource::Following => session.run(posts.feed()).await,
        };
        match result {
            Ok(posts) => self.posts = posts,
            Err(err) => {
                tracing::debug!("feed load failed: {err}");
                self.error = Some(LOAD_POSTS_FAILED.to_string());
            }
        }
        self.loading = false;
    }

    /// A freshly created post goes on top.
    pub fn on_created(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    pub fn on_deleted(&mut self, post_id: &Id) {
        self.posts.retain(|post| &post.id != post_id);
    }

    /// Replaces the local copy with the server's post.
    pub fn on_liked(&mut self, updated: Post) {
        if let Some(slot) = self.posts.iter_mut().find(|post| post.id == updated.id) {
            *slot = updated;
        }
    }

    /// Toggles a like and applies the server's post.
    ///
    /// # Errors
    /// The request error; the list is left unchanged.
    pub async fn like(&mut self, session: &AuthSession, post_id: &Id) -> ApiResult<()> {
        let Some(post) = self.posts.iter().find(|post| &post.id == post_id) else {
            return Ok(());
        };
        let updated = PostCard::new(post, None).toggle_like(session).await?;
        self.on_liked(updated);
        Ok(())
    }

    /// Deletes a post and drops it from the list.
    ///
    /// # Errors
    /// The request error; the list is left unchanged.
    pub async fn delete(&mut self, session: &AuthSession, post_id: &Id) -> ApiResult<()> {
        session.run(session.api().posts().delete(post_id)).await?;
        self.on_deleted(post_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::{ApiClient, HttpClient};
    use crate::session::MemorySessionStore;

    fn session(server: &MockServer) -> AuthSession {
        let store = Arc::new(MemorySessionStore::new());
        let http = HttpClient::new(&server.uri(), Duration::from_secs(5), store).unwrap();
        AuthSession::new(ApiClient::new(http))
    }

    fn post_json(id: i64, likes: &[i64]) -> serde_json::Value {
        json!({
            "id": id,
            "userId": 1,
            "username": "alice",
            "content": format!("post {id}"),
            "likes": likes,
            "likesCount": likes.len()
        })
    }

    fn post(id: i64) -> Post {
        serde_json::from_value(post_json(id, &[])).unwrap()
    }

    #[tokio::test]
    async fn test_sources_hit_their_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_json(1, &[])])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/posts/feed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let session = session(&server);
        let mut all = FeedView::new(FeedSource::All);
        all.load(&session).await;
        assert_eq!(all.posts.len(), 1);
        assert!(!all.loading);

        let mut following = FeedView::new(FeedSource::Following);
        following.load(&session).await;
        assert!(following.posts.is_empty());
        assert!(following.error.is_none());
    }

    #[tokio::test]
    async fn test_load_failure_sets_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/posts"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "message": "db down" })),
            )
            .mount(&server)
            .await;

        let mut feed = FeedView::default();
        feed.load(&session(&server)).await;
        assert_eq!(feed.error.as_deref(), Some("Failed to load posts"));
        assert!(!feed.loading);
    }

    #[test]
    fn test_local_reconciliation() {
        let mut feed = FeedView::default();
        feed.posts = vec![post(1), post(2)];

        feed.on_created(post(3));
        assert_eq!(feed.posts[0].id, Id::Num(3));

        feed.on_deleted(&Id::Num(1));
        assert_eq!(feed.posts.len(), 2);

        let mut liked = post(2);
        liked.likes = vec![Id::Num(9)];
        liked.likes_count = 1;
        feed.on_liked(liked.clone());
        assert_eq!(feed.posts[1], liked);
    }

    #[tokio::test]
    async fn test_like_applies_server_post() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/posts/2/like"))
            .respond_with(ResponseTemplate::new(200).set_body_json(post_json(2, &[5, 6])))
            .expect(1)
            .mount(&server)
            .await;

        let mut feed = FeedView::default();
        feed.posts = vec![post(1), post(2)];
        feed.like(&session(&server), &Id::Num(2)).await.unwrap();
        assert_eq!(feed.posts[1].likes_count, 2);
        assert_eq!(feed.posts[0].likes_count, 0);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_post() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/posts/1"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let mut feed = FeedView::default();
        feed.posts = vec![post(1)];
        assert!(feed.delete(&session(&server), &Id::Num(1)).await.is_err());
        assert_eq!(feed.posts.len(), 1);
    }
}
