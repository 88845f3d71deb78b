//! Inbound GitHub webhook deliveries.
//!
//! Deliveries reach the [`Dispatcher`] either through the direct HTTP
//! [`listener`] or through the server-sent-event [`relay`]. The dispatcher
//! checks the HMAC signature and routes the raw payload to the handler
//! registered for the event name.

pub mod dispatcher;
pub mod listener;
pub mod payload;
pub mod pull_request;
pub mod relay;
pub mod review;
pub mod signature;

pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherBuilder, EventHandler};
pub use pull_request::PullRequestHandler;
pub use review::ReviewHandler;

use thiserror::Error;

use crate::chat::ChatError;
use crate::github::GitHubError;

/// Event name of pull request lifecycle deliveries.
pub const PULL_REQUEST_EVENT: &str = "pull_request";
/// Event name of submitted review deliveries.
pub const PULL_REQUEST_REVIEW_EVENT: &str = "pull_request_review";

/// One delivery as received from GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEnvelope {
    /// Delivery identifier (`X-GitHub-Delivery`).
    pub id: String,
    /// Event name (`X-GitHub-Event`).
    pub name: String,
    /// Signature header (`X-Hub-Signature-256`).
    pub signature: String,
    /// Raw request body, exactly as signed.
    pub payload: Vec<u8>,
}

/// Errors raised while receiving or handling deliveries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookError {
    /// The signature header does not have the `sha256=<hex>` shape.
    #[error("malformed signature: {message}")]
    MalformedSignature {
        /// What was wrong with the header.
        message: String,
    },

    /// The signature does not match the payload under the shared secret.
    #[error("signature does not match payload")]
    SignatureMismatch,

    /// The payload could not be decoded for the handler.
    #[error("invalid webhook payload: {message}")]
    Payload {
        /// Decoder error detail.
        message: String,
    },

    /// A GitHub call made by a handler failed.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// A chat call made by a handler failed.
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// The transport feeding the dispatcher failed.
    #[error("webhook transport error: {message}")]
    Transport {
        /// Transport error detail.
        message: String,
    },
}

impl From<serde_json::Error> for WebhookError {
    fn from(error: serde_json::Error) -> Self {
        Self::Payload {
            message: error.to_string(),
        }
    }
}
