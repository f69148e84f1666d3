//! Client-side form checks that run before any request is made.

use std::fmt;
use std::sync::LazyLock;

use kampung_types::{NewPost, Registration};
use regex::Regex;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 30;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Input rejected locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyPostContent,
    PasswordMismatch,
    PasswordTooShort { min: usize },
    UsernameLength { min: usize, max: usize },
    InvalidEmail,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyPostContent => write!(f, "Post content is required"),
            ValidationError::PasswordMismatch => write!(f, "Passwords do not match"),
            ValidationError::PasswordTooShort { min } => {
                write!(f, "Password must be at least {min} characters")
            }
            ValidationError::UsernameLength { min, max } => {
                write!(f, "Username must be between {min} and {max} characters")
            }
            ValidationError::InvalidEmail => write!(f, "Please enter a valid email address"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Registration form as entered, including the confirmation field.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegistrationForm {
    /// Checks the form and strips the confirmation field.
    ///
    /// Checks run in the order the form presents them to the user:
    /// password match, password length, username length, email.
    ///
    /// # Errors
    /// The first failed check.
    pub fn validate(&self) -> Result<Registration, ValidationError> {
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LENGTH,
            });
        }
        let username = self.username.trim();
        let username_len = username.chars().count();
        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&username_len) {
            return Err(ValidationError::UsernameLength {
                min: USERNAME_MIN_LENGTH,
                max: USERNAME_MAX_LENGTH,
            });
        }
        let email = self.email.trim();
        if !EMAIL_RE.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(Registration {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Rejects posts whose content is empty after trimming.
///
/// # Errors
/// `EmptyPostContent` for blank content.
pub fn validate_post(title: Option<&str>, content: &str) -> Result<NewPost, ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyPostContent);
    }
    let title = title
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string);
    Ok(NewPost {
        title,
        content: content.to_string(),
    })
}
