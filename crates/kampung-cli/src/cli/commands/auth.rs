//! Login, registration and session commands.

use anyhow::Result;
use kampung_core::AuthSession;
use kampung_core::validation::RegistrationForm;
use kampung_types::Credentials;

pub async fn login(session: &AuthSession, username: &str, password: &str) -> Result<()> {
    let user = session
        .login(&Credentials::new(username, password))
        .await?;
    println!("Logged in as @{}", user.username);
    Ok(())
}

pub async fn register(
    session: &AuthSession,
    username: String,
    email: String,
    password: String,
    confirm_password: String,
) -> Result<()> {
    let form = RegistrationForm {
        username,
        email,
        password,
        confirm_password,
    };
    session.register(&form).await?;
    println!(
        "Registered @{}. Run `kampung login -u {}` to sign in.",
        form.username.trim(),
        form.username.trim()
    );
    Ok(())
}

pub fn logout(session: &AuthSession) {
    session.logout();
    println!("Logged out.");
}

pub fn whoami(session: &AuthSession) {
    match session.current_user() {
        Some(user) => println!("{} (@{}) id={}", user.display_name(), user.username, user.id),
        None => println!("Not logged in."),
    }
}
