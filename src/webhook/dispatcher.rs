//! Verification and routing of webhook envelopes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::signature::verify_signature;
use super::{WebhookEnvelope, WebhookError};
use crate::chat::ChatSink;

/// Handles every delivery of one event name.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Processes a verified payload.
    async fn handle(&self, chat: &dyn ChatSink, payload: &[u8]) -> Result<(), WebhookError>;
}

/// What happened to a dispatched envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The registered handler ran to completion.
    Handled,
    /// No handler is registered for the event name.
    Unhandled,
    /// The signature did not verify; nothing ran.
    Rejected,
    /// The handler returned an error, which was logged.
    Failed,
}

/// Collects handler registrations before building a [`Dispatcher`].
pub struct DispatcherBuilder {
    secret: String,
    chat: Arc<dyn ChatSink>,
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl DispatcherBuilder {
    /// Starts a registry verifying against `secret` and handing `chat` to
    /// handlers.
    #[must_use]
    pub fn new(secret: impl Into<String>, chat: Arc<dyn ChatSink>) -> Self {
        Self {
            secret: secret.into(),
            chat,
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `event_name`, replacing any earlier one.
    #[must_use]
    pub fn register(mut self, event_name: &str, handler: Arc<dyn EventHandler>) -> Self {
        if self.handlers.insert(event_name.to_owned(), handler).is_some() {
            tracing::warn!(event_name, "replacing previously registered webhook handler");
        }
        self
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            secret: self.secret,
            chat: self.chat,
            handlers: self.handlers,
        }
    }
}

/// Routes verified envelopes to their handlers.
pub struct Dispatcher {
    secret: String,
    chat: Arc<dyn ChatSink>,
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl Dispatcher {
    /// Verifies and routes one envelope. Never fails; problems are logged
    /// and reflected in the returned outcome.
    pub async fn dispatch(&self, envelope: &WebhookEnvelope) -> DispatchOutcome {
        if let Err(error) = verify_signature(&self.secret, &envelope.payload, &envelope.signature) {
            tracing::warn!(
                delivery = %envelope.id,
                event = %envelope.name,
                %error,
                "dropping webhook delivery that failed verification"
            );
            return DispatchOutcome::Rejected;
        }

        let Some(handler) = self.handlers.get(&envelope.name) else {
            tracing::debug!(
                delivery = %envelope.id,
                event = %envelope.name,
                "no handler registered for webhook event"
            );
            return DispatchOutcome::Unhandled;
        };

        tracing::info!(delivery = %envelope.id, event = %envelope.name, "routing webhook delivery");
        match handler.handle(self.chat.as_ref(), &envelope.payload).await {
            Ok(()) => DispatchOutcome::Handled,
            Err(error) => {
                tracing::warn!(
                    delivery = %envelope.id,
                    event = %envelope.name,
                    %error,
                    "webhook handler failed"
                );
                DispatchOutcome::Failed
            }
        }
    }
}
