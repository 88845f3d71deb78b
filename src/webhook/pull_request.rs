//! Handler for `pull_request` deliveries.

use std::sync::Arc;

use async_trait::async_trait;

use super::payload::PullRequestEvent;
use super::{EventHandler, WebhookError};
use crate::chat::{ChatSink, MentionResolver};
use crate::correlator::{NotificationCorrelator, PullRequestRef};
use crate::github::{PullRequestNumber, PullRequestSource};
use crate::notifications::{self, deliver};

/// Feeds the correlator and posts lifecycle notices.
#[derive(Clone)]
pub struct PullRequestHandler {
    correlator: NotificationCorrelator,
    source: Arc<dyn PullRequestSource>,
    mentions: MentionResolver,
}

impl PullRequestHandler {
    /// Creates the handler over its collaborators.
    #[must_use]
    pub fn new(
        correlator: NotificationCorrelator,
        source: Arc<dyn PullRequestSource>,
        mentions: MentionResolver,
    ) -> Self {
        Self {
            correlator,
            source,
            mentions,
        }
    }

    async fn reopened(&self, chat: &dyn ChatSink, pull_number: u64) -> Result<(), WebhookError> {
        let number = PullRequestNumber::new(pull_number)?;
        let Some(current) = self.source.pull_request(number).await? else {
            tracing::warn!(pull_number = number.get(), "re-opened pull request no longer exists");
            return Ok(());
        };

        let mentions = self.mentions.mention_logins(current.reviewers()).await;
        deliver(
            chat,
            &notifications::reopened(&mentions, &PullRequestRef::from(&current)),
        )
        .await;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for PullRequestHandler {
    async fn handle(&self, chat: &dyn ChatSink, payload: &[u8]) -> Result<(), WebhookError> {
        let event: PullRequestEvent = serde_json::from_slice(payload)?;
        let pull_request = PullRequestRef::from(&event.pull_request);

        match event.action.as_str() {
            "opened" => {
                self.correlator.opened(pull_request).await;
            }
            "review_requested" => {
                let Some(reviewer) = event.requested_reviewer.and_then(|user| user.login) else {
                    tracing::debug!(
                        pull_number = pull_request.number,
                        "ignoring review request without a user reviewer"
                    );
                    return Ok(());
                };
                let correlation = self
                    .correlator
                    .review_requested(pull_request, &reviewer)
                    .await;
                tracing::debug!(%reviewer, ?correlation, "review request correlated");
            }
            "reopened" => self.reopened(chat, event.pull_request.number).await?,
            "closed" if event.pull_request.is_merged() => {
                deliver(chat, &notifications::merged(&pull_request)).await;
            }
            "closed" => {
                let mentions = self
                    .mentions
                    .mention_logins(event.pull_request.reviewer_logins())
                    .await;
                deliver(chat, &notifications::closed(&mentions, &pull_request)).await;
            }
            other => tracing::debug!(action = other, "ignoring pull_request action"),
        }
        Ok(())
    }
}
