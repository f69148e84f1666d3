//! Wire types shared by the KampunG client crates.

mod auth;
mod id;
mod post;
mod user;

pub use auth::{Credentials, LoginData, LoginResponse, LoginShapeError, Registration};
pub use id::Id;
pub use post::{NewPost, Post};
pub use user::{FollowStatus, UserSummary};
