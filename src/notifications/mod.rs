//! Chat notifications about pull-request lifecycle and review duty.
//!
//! The builders here only assemble text. Delivery goes through
//! [`ChatSink`], and failures are logged and swallowed because chat
//! delivery is best effort.

use std::sync::Arc;

use async_trait::async_trait;

use crate::chat::{COURT_DUTY_TITLE, ChatSink, MentionResolver, Notification, hyperlink};
use crate::correlator::{PullRequestRef, ReviewSummons, SummonsEmitter};

/// Title of the merge notice.
pub const MERGE_NOTICE_TITLE: &str = "Review Police merge notice";
/// Title of the notice sent to the product owner after an approval.
pub const APPROVAL_TITLE: &str = "How does the judge respond?";
/// Title of the notice sent to the author after changes were requested.
pub const VERDICT_TITLE: &str = "A verdict has been made";

fn pull_link(pull_request: &PullRequestRef) -> String {
    hyperlink(
        &format!("#{}: {}", pull_request.number, pull_request.title),
        &pull_request.url,
    )
}

fn addressed(mentions: &str, body: &str) -> String {
    if mentions.trim().is_empty() {
        body.to_owned()
    } else {
        format!("{}: {body}", mentions.trim())
    }
}

/// Summons one or more reviewers to a pull request.
#[must_use]
pub fn summons(mentions: &str, pull_request: &PullRequestRef) -> Notification {
    let body = format!(
        "You have been summoned for review duty on pull request {}. Please either accept the \
         review request by using the /accept command, or ignore this message.",
        pull_link(pull_request)
    );
    Notification::new(COURT_DUTY_TITLE, addressed(mentions, &body)).with_url(&pull_request.url)
}

/// Tells the current reviewers that a pull request is open again.
#[must_use]
pub fn reopened(mentions: &str, pull_request: &PullRequestRef) -> Notification {
    let body = format!(
        "The pull request {} has been re-opened. You are back on for review-duty, get a move on! \
         👮",
        pull_link(pull_request)
    );
    Notification::new(COURT_DUTY_TITLE, addressed(mentions, &body)).with_url(&pull_request.url)
}

/// Announces a merge to the whole channel.
#[must_use]
pub fn merged(pull_request: &PullRequestRef) -> Notification {
    let body = format!(
        "The pull request {} has been merged. Good job everybody! 👍",
        pull_link(pull_request)
    );
    Notification::new(MERGE_NOTICE_TITLE, body).with_url(&pull_request.url)
}

/// Releases the requested reviewers of a pull request closed without merging.
#[must_use]
pub fn closed(mentions: &str, pull_request: &PullRequestRef) -> Notification {
    let body = format!(
        "The pull request {} has been closed. You have been set free from review duty this time, \
         I'll catch you next time 🚓",
        pull_link(pull_request)
    );
    Notification::new(COURT_DUTY_TITLE, addressed(mentions, &body)).with_url(&pull_request.url)
}

/// Hands an approved pull request over to the product owner.
#[must_use]
pub fn approved(
    product_owner: &str,
    reviewer: &str,
    pull_request: &PullRequestRef,
) -> Notification {
    let body = format!(
        "Pull request {} has been approved by {reviewer}, it is now up to you to decide its \
         destiny.",
        pull_link(pull_request)
    );
    Notification::new(APPROVAL_TITLE, addressed(product_owner, &body)).with_url(&pull_request.url)
}

/// Sends the author back to address review comments.
#[must_use]
pub fn changes_requested(author: &str, pull_request: &PullRequestRef) -> Notification {
    let body = format!(
        "The judge has ruled to take this to a higher instance. Changes have been requested for \
         the pull request {}. Address the comments, then re-request the review in GitHub.",
        pull_link(pull_request)
    );
    Notification::new(VERDICT_TITLE, addressed(author, &body)).with_url(&pull_request.url)
}

/// Posts a notification, logging rather than returning delivery failures.
pub async fn deliver(sink: &dyn ChatSink, notification: &Notification) {
    match sink.send_notification(notification).await {
        Ok(handle) => tracing::debug!(message_id = %handle.0, "notification delivered"),
        Err(error) => tracing::warn!(
            %error,
            title = %notification.title,
            "failed to deliver notification"
        ),
    }
}

/// [`SummonsEmitter`] that mentions the reviewers in the chat channel.
#[derive(Clone)]
pub struct ChatSummonsEmitter {
    mentions: MentionResolver,
    sink: Arc<dyn ChatSink>,
}

impl ChatSummonsEmitter {
    /// Creates an emitter posting through `sink`.
    #[must_use]
    pub fn new(mentions: MentionResolver, sink: Arc<dyn ChatSink>) -> Self {
        Self { mentions, sink }
    }
}

#[async_trait]
impl SummonsEmitter for ChatSummonsEmitter {
    async fn emit(&self, summons: ReviewSummons) {
        let mentions = self
            .mentions
            .mention_logins(summons.reviewers.iter().map(String::as_str))
            .await;
        deliver(
            self.sink.as_ref(),
            &self::summons(&mentions, &summons.pull_request),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::{ChatSummonsEmitter, closed, merged, summons};
    use crate::chat::{
        COURT_DUTY_TITLE, ChatError, DisplayHandle, MentionResolver, MessageHandle, MockChatSink,
    };
    use crate::correlator::{PullRequestRef, ReviewSummons, SummonsEmitter};
    use crate::identity::{IdentityMapper, IdentityMapping};

    #[fixture]
    fn pull_request() -> PullRequestRef {
        PullRequestRef {
            number: 42,
            title: "Add widgets".to_owned(),
            url: "https://github.com/octo/repo/pull/42".to_owned(),
        }
    }

    #[rstest]
    fn summons_addresses_reviewers(pull_request: PullRequestRef) {
        let notification = summons("<@1> bob", &pull_request);

        assert_eq!(notification.title, COURT_DUTY_TITLE);
        insta::assert_snapshot!(notification.description, @"<@1> bob: You have been summoned for review duty on pull request [#42: Add widgets](https://github.com/octo/repo/pull/42). Please either accept the review request by using the /accept command, or ignore this message.");
    }

    #[rstest]
    fn merge_notice_mentions_nobody(pull_request: PullRequestRef) {
        let notification = merged(&pull_request);

        assert!(notification.description.starts_with("The pull request [#42"));
        assert!(notification.description.contains("Good job everybody!"));
    }

    #[rstest]
    fn closed_notice_without_reviewers_has_no_prefix(pull_request: PullRequestRef) {
        let notification = closed("", &pull_request);

        assert!(notification.description.starts_with("The pull request"));
        assert!(notification.description.contains("set free from review duty"));
    }

    #[rstest]
    #[tokio::test]
    async fn emitter_mentions_every_reviewer(pull_request: PullRequestRef) {
        let identities = Arc::new(IdentityMapper::new(vec![IdentityMapping {
            discord_id: "111".to_owned(),
            github_login: "alice".to_owned(),
        }]));

        let mut resolving = MockChatSink::new();
        resolving
            .expect_resolve_mention()
            .returning(|id| Ok(DisplayHandle(format!("<@{id}>"))));

        let mut posting = MockChatSink::new();
        posting
            .expect_send_notification()
            .withf(|notification| notification.description.starts_with("<@111> bob: "))
            .times(1)
            .returning(|_| Ok(MessageHandle("1".to_owned())));

        let emitter = ChatSummonsEmitter::new(
            MentionResolver::new(identities, Arc::new(resolving)),
            Arc::new(posting),
        );
        emitter
            .emit(ReviewSummons {
                pull_request,
                reviewers: vec!["alice".to_owned(), "bob".to_owned()],
            })
            .await;
    }

    #[rstest]
    #[tokio::test]
    async fn delivery_failures_are_swallowed(pull_request: PullRequestRef) {
        let mut sink = MockChatSink::new();
        sink.expect_send_notification().times(1).returning(|_| {
            Err(ChatError::Network {
                message: "offline".to_owned(),
            })
        });

        super::deliver(&sink, &merged(&pull_request)).await;
    }
}
