//! View-state models.
//!
//! Each view holds its own `loading`/`error`/data fields and reaches the
//! server only through an [`AuthSession`](crate::session::AuthSession), so a
//! 401 from any of them ends the session in one place. Local lists are
//! reconciled from server responses rather than refetched.

mod compose;
mod feed;
mod post_card;
mod profile;
mod search;
mod user_card;

pub use compose::{CREATE_FAILED, ComposeForm};
pub use feed::{FeedSource, FeedView, LOAD_POSTS_FAILED};
pub use post_card::{DELETE_FAILED, PostCard, relative_time};
pub use profile::{LOAD_PROFILE_FAILED, PROFILE_NOT_FOUND, ProfileTab, ProfileView};
pub use search::{SEARCH_FAILED, SearchState, SearchView, UserSearch};
pub use user_card::UserCard;
