//! Plain-text rendering of posts and users.

use chrono::Utc;
use kampung_core::views::{PostCard, UserCard};
use kampung_types::{Id, Post, UserSummary};

pub fn post(post: &Post, viewer: Option<&Id>) {
    let card = PostCard::new(post, viewer);
    println!(
        "[{}] {} @{}  {}",
        post.id,
        card.author_initial(),
        card.author(),
        card.timestamp(Utc::now())
    );
    if let Some(title) = post.title.as_deref().filter(|t| !t.is_empty()) {
        println!("  {title}");
    }
    for line in post.content.lines() {
        println!("  {line}");
    }
    let liked = if card.is_liked() { " (liked)" } else { "" };
    let owner = if card.is_owner() { "  yours" } else { "" };
    println!(
        "  likes: {}{liked}  comments: {}{owner}",
        card.display_likes(),
        post.comments_count
    );
}

pub fn posts(posts: &[Post], viewer: Option<&Id>) {
    if posts.is_empty() {
        println!("No posts yet.");
        return;
    }
    for (i, item) in posts.iter().enumerate() {
        if i > 0 {
            println!();
        }
        post(item, viewer);
    }
}

pub fn user(card: &UserCard) {
    let user = &card.user;
    let following = if card.following() { "  following" } else { "" };
    if card.display_name() == user.username {
        println!(
            "[{}] @{}  followers: {}{following}",
            user.id,
            user.username,
            card.followers_count()
        );
    } else {
        println!(
            "[{}] {} (@{})  followers: {}{following}",
            user.id,
            card.display_name(),
            user.username,
            card.followers_count()
        );
    }
}

pub fn users(users: Vec<UserSummary>, empty: &str) {
    if users.is_empty() {
        println!("{empty}");
        return;
    }
    for summary in users {
        user(&UserCard::new(summary));
    }
}

pub fn profile_header(user: &UserSummary) {
    println!("{} (@{})", user.display_name(), user.username);
    if let Some(bio) = user.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        println!("{bio}");
    }
    println!(
        "followers: {}  following: {}",
        user.followers_count, user.following_count
    );
}
