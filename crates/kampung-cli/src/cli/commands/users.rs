//! Profile, follow and search command handlers.

use anyhow::{Context, Result, bail};
use kampung_core::views::{ProfileTab, ProfileView, SearchView, UserCard};
use kampung_core::{AuthSession, Config};
use kampung_types::Id;

use super::{render, require_login};

pub async fn profile(session: &AuthSession, user_id: Option<Id>, tab: ProfileTab) -> Result<()> {
    let viewer = require_login(session)?;
    let mut view = ProfileView::new(user_id);
    view.load(session).await;
    if let Some(problem) = view.problem() {
        bail!("{problem}");
    }
    let Some(user) = &view.user else {
        return Ok(());
    };
    render::profile_header(user);
    println!();

    view.select_tab(session, tab).await;
    match tab {
        ProfileTab::Posts => render::posts(&view.posts, Some(&viewer.id)),
        ProfileTab::Followers => render::users(view.followers, "No followers yet."),
        ProfileTab::Following => render::users(view.following, "Not following anyone yet."),
    }
    Ok(())
}

pub async fn follow(session: &AuthSession, user_id: &Id) -> Result<()> {
    require_login(session)?;
    let user = session
        .run(session.api().users().by_id(user_id))
        .await
        .with_context(|| format!("load user {user_id}"))?;
    let mut card = UserCard::new(user);
    card.toggle_follow(session)
        .await
        .with_context(|| format!("follow user {user_id}"))?;
    let verb = if card.following() {
        "Now following"
    } else {
        "Unfollowed"
    };
    println!(
        "{verb} @{} ({} followers)",
        card.user.username,
        card.followers_count()
    );
    Ok(())
}

pub async fn search(session: &AuthSession, config: &Config, query: String) -> Result<()> {
    require_login(session)?;
    let mut view = SearchView::new(session.clone(), config.search_debounce());
    view.set_query(query);
    view.settle().await;
    let state = view.state();
    if let Some(error) = state.error {
        bail!("{error}");
    }
    render::users(state.users, "No users found.");
    Ok(())
}
