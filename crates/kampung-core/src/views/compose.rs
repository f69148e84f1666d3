use kampung_types::Post;

use crate::session::AuthSession;
use crate::validation::validate_post;

pub const CREATE_FAILED: &str = "Failed to create post";

/// New-post form.
#[derive(Debug, Clone, Default)]
pub struct ComposeForm {
    pub title: String,
    pub content: String,
    pub submitting: bool,
    pub error: Option<String>,
}

impl ComposeForm {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Submits the form. Blank content is rejected without a request.
    ///
    /// On success the form is cleared and the server's post is returned for
    /// the caller to prepend. On failure `error` holds the message to show.
    pub async fn submit(&mut self, session: &AuthSession) -> Option<Post> {
        let new_post = match validate_post(Some(&self.title), &self.content) {
            Ok(new_post) => new_post,
            Err(err) => {
                self.error = Some(err.to_string());
                return None;
            }
        };

        self.submitting = true;
        self.error = None;
        let result = session.run(session.api().posts().create(&new_post)).await;
        self.submitting = false;

        match result {
            Ok(post) => {
                self.title.clear();
                self.content.clear();
                Some(post)
            }
            Err(err) => {
                self.error = Some(err.user_message(CREATE_FAILED));
                None
            }
        }
    }
}
