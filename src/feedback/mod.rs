//! Feedback Service
//!
//! Visitors leave a name, an email address and a message. Submissions are
//! validated, appended to a JSON file and counted; a small HTTP server
//! exposes this to the page.

mod server;
mod store;
mod validate;

pub use server::{FeedbackService, Reply, DEFAULT_PORT};
pub use store::{FeedbackEntry, FeedbackFile, FeedbackStats, FeedbackStore, DEFAULT_STORE_FILE};
pub use validate::{Submission, ValidationError};

/// Feedback error
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("server error: {0}")]
    Server(String),
}
