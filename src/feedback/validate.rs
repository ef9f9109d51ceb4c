//! Submission validation
//!
//! All checks run on trimmed input. Lengths count characters.

use serde::{Deserialize, Serialize};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;
const MESSAGE_MIN: usize = 10;
const MESSAGE_MAX: usize = 1000;

/// A rejected submission field
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be at least 2 characters")]
    NameTooShort,
    #[error("Name must be less than 50 characters")]
    NameTooLong,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    EmailInvalid,
    #[error("Message is required")]
    MessageRequired,
    #[error("Message must be at least 10 characters")]
    MessageTooShort,
    #[error("Message must be less than 1000 characters")]
    MessageTooLong,
}

/// A feedback form as posted by the page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

impl Submission {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Check every field, returning the trimmed submission.
    ///
    /// Fields are checked in form order; the first failure wins.
    pub fn validated(&self) -> Result<Submission, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        match name.chars().count() {
            0 => return Err(ValidationError::NameRequired),
            n if n < NAME_MIN => return Err(ValidationError::NameTooShort),
            n if n > NAME_MAX => return Err(ValidationError::NameTooLong),
            _ => {}
        }

        if email.is_empty() {
            return Err(ValidationError::EmailRequired);
        }
        if !is_email(email) {
            return Err(ValidationError::EmailInvalid);
        }

        match message.chars().count() {
            0 => return Err(ValidationError::MessageRequired),
            n if n < MESSAGE_MIN => return Err(ValidationError::MessageTooShort),
            n if n > MESSAGE_MAX => return Err(ValidationError::MessageTooLong),
            _ => {}
        }

        Ok(Submission::new(name, email, message))
    }
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let (local, domain) = match value.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
