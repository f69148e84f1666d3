use chrono::{DateTime, NaiveDateTime, Utc};
use kampung_types::{Id, Post};

use crate::api::ApiResult;
use crate::session::AuthSession;

pub const DELETE_FAILED: &str = "Failed to delete post";

const ANONYMOUS: &str = "Anonymous";
const FALLBACK_INITIAL: char = 'U';

/// One post as seen by `viewer`.
#[derive(Debug, Clone, Copy)]
pub struct PostCard<'a> {
    pub post: &'a Post,
    viewer: Option<&'a Id>,
}

impl<'a> PostCard<'a> {
    pub fn new(post: &'a Post, viewer: Option<&'a Id>) -> Self {
        Self { post, viewer }
    }

    pub fn is_owner(&self) -> bool {
        self.viewer == Some(&self.post.user_id)
    }

    pub fn is_liked(&self) -> bool {
        self.viewer.is_some_and(|id| self.post.is_liked_by(id))
    }

    /// `likesCount` when the server set it, else the length of `likes`.
    pub fn display_likes(&self) -> u64 {
        if self.post.likes_count > 0 {
            self.post.likes_count
        } else {
            u64::try_from(self.post.likes.len()).unwrap_or(u64::MAX)
        }
    }

    pub fn author(&self) -> &str {
        if self.post.username.is_empty() {
            ANONYMOUS
        } else {
            &self.post.username
        }
    }

    pub fn author_initial(&self) -> char {
        self.post
            .username
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or(FALLBACK_INITIAL)
    }

    pub fn timestamp(&self, now: DateTime<Utc>) -> String {
        relative_time(&self.post.created_at, now)
    }

    /// Toggles the viewer's like. The returned post replaces the local copy.
    pub async fn toggle_like(&self, session: &AuthSession) -> ApiResult<Post> {
        session.run(session.api().posts().like(&self.post.id)).await
    }

    pub async fn delete(&self, session: &AuthSession) -> ApiResult<()> {
        session.run(session.api().posts().delete(&self.post.id)).await
    }
}

/// Formats a server timestamp relative to `now`.
///
/// Under a minute reads "Just now", then minutes, hours and days up to a
/// week; older posts show the calendar date. Unparseable input is returned
/// unchanged.
pub fn relative_time(created_at: &str, now: DateTime<Utc>) -> String {
    let Some(created) = parse_timestamp(created_at) else {
        return created_at.to_string();
    };
    let elapsed = now.signed_duration_since(created);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        created.format("%Y-%m-%d").to_string()
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Server timestamps without an offset are UTC.
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn post(username: &str, likes: Vec<Id>, likes_count: u64) -> Post {
        Post {
            id: Id::Num(10),
            user_id: Id::Num(1),
            username: username.to_string(),
            title: None,
            content: "hello".to_string(),
            created_at: "2024-05-01T10:00:00Z".to_string(),
            likes,
            likes_count,
            comments_count: 0,
        }
    }

    #[test]
    fn test_ownership_and_like_state() {
        let post = post("alice", vec![Id::Num(2)], 1);
        let owner = Id::Num(1);
        let fan = Id::Num(2);

        assert!(PostCard::new(&post, Some(&owner)).is_owner());
        assert!(!PostCard::new(&post, Some(&owner)).is_liked());
        assert!(PostCard::new(&post, Some(&fan)).is_liked());
        assert!(!PostCard::new(&post, None).is_owner());
        assert!(!PostCard::new(&post, None).is_liked());
    }

    #[test]
    fn test_display_likes_falls_back_to_list_length() {
        assert_eq!(PostCard::new(&post("a", vec![], 4), None).display_likes(), 4);
        let listed = post("a", vec![Id::Num(2), Id::Num(3)], 0);
        assert_eq!(PostCard::new(&listed, None).display_likes(), 2);
        assert_eq!(PostCard::new(&post("a", vec![], 0), None).display_likes(), 0);
    }

    #[test]
    fn test_anonymous_author() {
        let post = post("", vec![], 0);
        let card = PostCard::new(&post, None);
        assert_eq!(card.author(), "Anonymous");
        assert_eq!(card.author_initial(), 'U');

        let named = self::post("bob", vec![], 0);
        assert_eq!(PostCard::new(&named, None).author_initial(), 'B');
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(relative_time("2024-05-10T11:59:30Z", now), "Just now");
        assert_eq!(relative_time("2024-05-10T11:15:00Z", now), "45m ago");
        assert_eq!(relative_time("2024-05-10T02:00:00Z", now), "10h ago");
        assert_eq!(relative_time("2024-05-07T12:00:00Z", now), "3d ago");
        assert_eq!(relative_time("2024-05-01T10:00:00Z", now), "2024-05-01");
    }

    #[test]
    fn test_relative_time_accepts_naive_and_garbage() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(relative_time("2024-05-10T11:00:00.000", now), "1h ago");
        assert_eq!(relative_time("2024-05-10T11:00:00.123", now), "59m ago");
        assert_eq!(relative_time("yesterday", now), "yesterday");
    }
}
