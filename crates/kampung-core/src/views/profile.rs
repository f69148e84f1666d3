use kampung_types::{FollowStatus, Id, Post, UserSummary};

use crate::api::ApiResult;
use crate::session::AuthSession;

pub const LOAD_PROFILE_FAILED: &str = "Failed to load profile";
pub const PROFILE_NOT_FOUND: &str = "Profile not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Posts,
    Followers,
    Following,
}

/// A user's profile page: header, posts, and follower tabs.
#[derive(Debug, Default)]
pub struct ProfileView {
    /// Requested user; `None` means the signed-in user.
    target: Option<Id>,
    /// User whose data is shown, resolved on load.
    subject: Option<Id>,
    own: bool,
    pub user: Option<UserSummary>,
    pub posts: Vec<Post>,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
    pub tab: ProfileTab,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProfileView {
    pub fn new(target: Option<Id>) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Whether the last load showed the signed-in user's own profile.
    pub fn is_own(&self) -> bool {
        self.own
    }

    /// Loads the header and the user's posts.
    ///
    /// The own profile comes from `/users/me`; anyone else's from
    /// `/users/:id`. Nothing is fetched when there is no target and no one is
    /// signed in.
    pub async fn load(&mut self, session: &AuthSession) {
        let viewer = session.current_user().map(|user| user.id);
        self.own = match &self.target {
            None => true,
            Some(id) => viewer.as_ref() == Some(id),
        };
        let Some(subject) = self.target.clone().or(viewer) else {
            return;
        };
        self.subject = Some(subject.clone());

        self.loading = true;
        self.error = None;
        if let Err(err) = self.fetch(session, &subject).await {
            tracing::debug!(user_id = %subject, "profile load failed: {err}");
            self.error = Some(LOAD_PROFILE_FAILED.to_string());
        }
        self.loading = false;
    }

    async fn fetch(&mut self, session: &AuthSession, subject: &Id) -> ApiResult<()> {
        let users = session.api().users();
        let user = if self.own {
            session.run(users.me()).await?
        } else {
            session.run(users.by_id(subject)).await?
        };
        self.user = Some(user);
        self.posts = session.run(session.api().posts().by_user(subject)).await?;
        Ok(())
    }

    /// What to show instead of the profile, if anything.
    pub fn problem(&self) -> Option<&str> {
        if self.loading {
            return None;
        }
        match (&self.error, &self.user) {
            (Some(error), _) => Some(error),
            (None, None) => Some(PROFILE_NOT_FOUND),
            (None, Some(_)) => None,
        }
    }

    /// Switches tabs and fetches the follower list it shows.
    ///
    /// A failed list fetch is logged and leaves the previous list in place.
    pub async fn select_tab(&mut self, session: &AuthSession, tab: ProfileTab) {
        self.tab = tab;
        let Some(subject) = self.subject.clone() else {
            return;
        };
        let users = session.api().users();
        let (result, slot) = match tab {
            ProfileTab::Posts => return,
            ProfileTab::Followers => (
                session.run(users.followers(&subject)).await,
                &mut self.followers,
            ),
            ProfileTab::Following => (
                session.run(users.following(&subject)).await,
                &mut self.following,
            ),
        };
        match result {
            Ok(list) => *slot = list,
            Err(err) => tracing::warn!(user_id = %subject, ?tab, "Failed to fetch follow data: {err}"),
        }
    }

    /// Toggles following the shown user and applies the server's answer.
    ///
    /// # Errors
    /// The request error; the header is left unchanged.
    pub async fn toggle_follow(&mut self, session: &AuthSession) -> ApiResult<Option<FollowStatus>> {
        let Some(subject) = self.subject.clone() else {
            return Ok(None);
        };
        let status = session.run(session.api().users().follow(&subject)).await?;
        if let Some(user) = &mut self.user {
            user.apply_follow(status);
        }
        Ok(Some(status))
    }

    pub fn on_deleted(&mut self, post_id: &Id) {
        self.posts.retain(|post| &post.id != post_id);
    }

    pub fn on_liked(&mut self, updated: Post) {
        if let Some(slot) = self.posts.iter_mut().find(|post| post.id == updated.id) {
            *slot = updated;
        }
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
    use crate::session::{MemorySessionStore, SessionStore, keys};

    fn signed_in(server: &MockServer) -> AuthSession {
        let store = Arc::new(MemorySessionStore::new());
        store.set(keys::ACCESS_TOKEN, "t1").unwrap();
        store
            .set(keys::USER, r#"{"id":1,"username":"alice"}"#)
            .unwrap();
        let http = HttpClient::new(&server.uri(), Duration::from_secs(5), store).unwrap();
        AuthSession::restore(ApiClient::new(http))
    }

    async fn mount_get(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_own_profile_uses_me() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "username": "alice" })),
            )
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/posts/user/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{ "id": 5, "userId": 1, "content": "x" }])),
            )
            .expect(2)
            .mount(&server)
            .await;

        let session = signed_in(&server);
        for target in [None, Some(Id::Num(1))] {
            let mut profile = ProfileView::new(target);
            profile.load(&session).await;
            assert!(profile.is_own());
            assert_eq!(profile.posts.len(), 1);
            assert!(profile.problem().is_none());
        }
    }

    #[tokio::test]
    async fn test_other_profile_and_tabs() {
        let server = MockServer::start().await;
        mount_get(&server, "/users/2", json!({ "id": 2, "username": "bob" })).await;
        mount_get(&server, "/posts/user/2", json!([])).await;
        mount_get(&server, "/users/2/followers", json!([{ "id": 1, "username": "alice" }]))
            .await;
        mount_get(&server, "/users/2/following", json!([])).await;

        let session = signed_in(&server);
        let mut profile = ProfileView::new(Some(Id::Num(2)));
        profile.load(&session).await;
        assert!(!profile.is_own());
        assert_eq!(profile.user.as_ref().unwrap().username, "bob");

        profile.select_tab(&session, ProfileTab::Posts).await;
        profile.select_tab(&session, ProfileTab::Followers).await;
        assert_eq!(profile.followers.len(), 1);
        profile.select_tab(&session, ProfileTab::Following).await;
        assert_eq!(profile.tab, ProfileTab::Following);
        assert!(profile.following.is_empty());
    }

    #[tokio::test]
    async fn test_follow_applies_server_status() {
        let server = MockServer::start().await;
        mount_get(&server, "/users/2", json!({ "id": 2, "username": "bob", "followersCount": 4 }))
            .await;
        mount_get(&server, "/posts/user/2", json!([])).await;
        Mock::given(method("POST"))
            .and(path("/users/2/follow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "following": true, "followersCount": 5 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = signed_in(&server);
        let mut profile = ProfileView::new(Some(Id::Num(2)));
        profile.load(&session).await;
        profile.toggle_follow(&session).await.unwrap();

        let user = profile.user.unwrap();
        assert!(user.following);
        assert_eq!(user.followers_count, 5);
    }

    #[tokio::test]
    async fn test_load_failure_and_missing_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let session = signed_in(&server);
        let mut profile = ProfileView::new(Some(Id::Num(9)));
        profile.load(&session).await;
        assert_eq!(profile.problem(), Some("Failed to load profile"));

        let store = Arc::new(MemorySessionStore::new());
        let http = HttpClient::new(&server.uri(), Duration::from_secs(5), store).unwrap();
        let anonymous = AuthSession::restore(ApiClient::new(http));
        let mut own = ProfileView::new(None);
        own.load(&anonymous).await;
        assert_eq!(own.problem(), Some("Profile not found"));
    }

    #[test]
    fn test_post_list_follows_like_and_delete() {
        let post = |id: i64| -> Post {
            serde_json::from_value(json!({ "id": id, "userId": 2, "content": "hi" })).unwrap()
        };
        let mut profile = ProfileView::new(Some(Id::Num(2)));
        profile.posts = vec![post(1), post(2)];

        let mut liked = post(2);
        liked.likes = vec![Id::Num(1)];
        liked.likes_count = 1;
        profile.on_liked(liked.clone());
        profile.on_liked(post(7));
        assert_eq!(profile.posts, vec![post(1), liked]);

        profile.on_deleted(&Id::Num(1));
        profile.on_deleted(&Id::Num(42));
        assert_eq!(profile.posts.len(), 1);
        assert_eq!(profile.posts[0].id, Id::Num(2));
    }
}
