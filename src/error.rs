//! Top-level error surfaced by the binary.

use thiserror::Error;

use crate::chat::ChatError;
use crate::github::GitHubError;
use crate::identity::IdentityError;
use crate::webhook::WebhookError;

/// Any failure that stops the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// GitHub setup or a GitHub call failed.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// Chat setup or a chat call failed.
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// The identity mapping could not be loaded.
    #[error("failed to load identity mappings: {0}")]
    Identity(#[from] IdentityError),

    /// A webhook transport failed.
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    /// Writing command output failed.
    #[error("failed to write output: {message}")]
    Io {
        /// Underlying I/O error.
        message: String,
    },
}
