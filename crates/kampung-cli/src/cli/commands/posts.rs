//! Post command handlers.

use anyhow::{Context, Result, bail};
use kampung_core::AuthSession;
use kampung_core::views::{ComposeForm, DELETE_FAILED, FeedSource, FeedView, PostCard};
use kampung_types::Id;

use super::{render, require_login};

pub async fn feed(session: &AuthSession, following: bool) -> Result<()> {
    let viewer = require_login(session)?;
    let source = if following {
        FeedSource::Following
    } else {
        FeedSource::All
    };
    let mut view = FeedView::new(source);
    view.load(session).await;
    if let Some(error) = view.error {
        bail!("{error}");
    }
    render::posts(&view.posts, Some(&viewer.id));
    Ok(())
}

pub async fn create(session: &AuthSession, content: String, title: Option<String>) -> Result<()> {
    let viewer = require_login(session)?;
    let mut form = ComposeForm::new(content);
    form.title = title.unwrap_or_default();
    let Some(post) = form.submit(session).await else {
        bail!("{}", form.error.unwrap_or_default());
    };
    render::post(&post, Some(&viewer.id));
    Ok(())
}

pub async fn show(session: &AuthSession, id: &Id) -> Result<()> {
    let viewer = require_login(session)?;
    let post = session
        .run(session.api().posts().by_id(id))
        .await
        .with_context(|| format!("load post {id}"))?;
    render::post(&post, Some(&viewer.id));
    Ok(())
}

pub async fn delete(session: &AuthSession, id: &Id) -> Result<()> {
    require_login(session)?;
    session
        .run(session.api().posts().delete(id))
        .await
        .context(DELETE_FAILED)?;
    println!("Deleted post {id}.");
    Ok(())
}

pub async fn like(session: &AuthSession, id: &Id) -> Result<()> {
    let viewer = require_login(session)?;
    let post = session
        .run(session.api().posts().by_id(id))
        .await
        .with_context(|| format!("load post {id}"))?;
    let updated = PostCard::new(&post, Some(&viewer.id))
        .toggle_like(session)
        .await
        .with_context(|| format!("like post {id}"))?;
    render::post(&updated, Some(&viewer.id));
    Ok(())
}

pub async fn by_user(session: &AuthSession, user_id: &Id) -> Result<()> {
    let viewer = require_login(session)?;
    let posts = session
        .run(session.api().posts().by_user(user_id))
        .await
        .with_context(|| format!("load posts for user {user_id}"))?;
    render::posts(&posts, Some(&viewer.id));
    Ok(())
}
