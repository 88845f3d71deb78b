//! Handler for `pull_request_review` deliveries.

use async_trait::async_trait;

use super::payload::PullRequestReviewEvent;
use super::{EventHandler, WebhookError};
use crate::chat::{ChatSink, MentionResolver};
use crate::correlator::PullRequestRef;
use crate::notifications::{self, deliver};

/// Tells the product owner about approvals and the author about requested
/// changes.
#[derive(Clone)]
pub struct ReviewHandler {
    mentions: MentionResolver,
    product_owner: Option<String>,
}

impl ReviewHandler {
    /// Creates the handler; `product_owner` is a GitHub login.
    #[must_use]
    pub const fn new(mentions: MentionResolver, product_owner: Option<String>) -> Self {
        Self {
            mentions,
            product_owner,
        }
    }

    async fn mention(&self, login: Option<&str>) -> String {
        match login {
            Some(login) => self.mentions.mention_login(login).await,
            None => String::new(),
        }
    }
}

#[async_trait]
impl EventHandler for ReviewHandler {
    async fn handle(&self, chat: &dyn ChatSink, payload: &[u8]) -> Result<(), WebhookError> {
        let event: PullRequestReviewEvent = serde_json::from_slice(payload)?;
        if event.action != "submitted" {
            tracing::debug!(action = %event.action, "ignoring pull_request_review action");
            return Ok(());
        }

        let pull_request = PullRequestRef::from(&event.pull_request);
        match event.review.state.to_ascii_lowercase().as_str() {
            "approved" => {
                if self.product_owner.is_none() {
                    tracing::warn!("no product owner configured to hand approvals to");
                }
                let owner = self.mention(self.product_owner.as_deref()).await;
                let reviewer = self.mention(event.review.user.login.as_deref()).await;
                deliver(
                    chat,
                    &notifications::approved(&owner, &reviewer, &pull_request),
                )
                .await;
            }
            "changes_requested" => {
                let author = self
                    .mention(event.pull_request.user.login.as_deref())
                    .await;
                deliver(
                    chat,
                    &notifications::changes_requested(&author, &pull_request),
                )
                .await;
            }
            state => tracing::debug!(state, "ignoring review state"),
        }
        Ok(())
    }
}
