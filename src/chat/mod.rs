//! Chat-side collaborators: sending notifications and resolving mentions.
//!
//! Both operations are best effort. Failures are returned to the caller,
//! which logs them; nothing here retries.

mod discord;
mod mentions;

pub use discord::{DiscordChatSink, DiscordConfig};
pub use mentions::MentionResolver;

use async_trait::async_trait;
use thiserror::Error;

/// Title used for review-duty notices.
pub const COURT_DUTY_TITLE: &str = "Review Police court duty";

/// Longest notification description the chat platform accepts, in
/// characters.
pub const DESCRIPTION_LIMIT: usize = 4096;

/// Errors surfaced by chat collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Required chat configuration is missing.
    #[error("chat configuration error: {message}")]
    Configuration {
        /// Details about the missing value.
        message: String,
    },

    /// Networking failed while calling the chat platform.
    #[error("network error talking to chat platform: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The chat platform rejected the request.
    #[error("chat API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned.
        status: u16,
        /// Response body excerpt.
        message: String,
    },

    /// The chat platform response could not be decoded.
    #[error("chat response could not be decoded: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },
}

/// Content of one chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short heading.
    pub title: String,
    /// Body text, including any mentions.
    pub description: String,
    /// Optional link the heading points at.
    pub url: Option<String>,
}

impl Notification {
    /// Creates a notification without a link.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: None,
        }
    }

    /// Attaches a link to the notification.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Identifier of a message the chat platform accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle(pub String);

/// Text that renders as a mention of a chat user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayHandle(pub String);

/// Destination channel for notifications.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Post a notification to the configured channel.
    async fn send_notification(
        &self,
        notification: &Notification,
    ) -> Result<MessageHandle, ChatError>;

    /// Resolve a chat user id into a mention that pings them.
    async fn resolve_mention(&self, chat_user_id: &str) -> Result<DisplayHandle, ChatError>;
}

/// Reply channel for the interaction that submitted a selection.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait SelectionResponder: Send + Sync {
    /// Acknowledge the selection, replacing the selection prompt.
    async fn acknowledge(&self, content: &str) -> Result<(), ChatError>;
}

/// Hyperlink in chat markdown.
#[must_use]
pub fn hyperlink(text: &str, url: &str) -> String {
    format!("[{text}]({url})")
}
