//! The subset of GitHub webhook payloads the handlers read.

use serde::Deserialize;

use crate::correlator::PullRequestRef;

/// A GitHub account; team reviewers arrive without a login.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct UserPayload {
    /// Account login.
    #[serde(default)]
    pub login: Option<String>,
}

/// Pull request as embedded in `pull_request` and `pull_request_review`
/// deliveries.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequestPayload {
    /// Pull request number.
    pub number: u64,
    /// Title at delivery time.
    #[serde(default)]
    pub title: String,
    /// HTML URL.
    #[serde(default)]
    pub html_url: String,
    /// Whether a closed pull request was merged; GitHub may send `null`.
    #[serde(default)]
    pub merged: Option<bool>,
    /// Author of the pull request.
    #[serde(default)]
    pub user: UserPayload,
    /// Requested reviewers at delivery time.
    #[serde(default)]
    pub requested_reviewers: Vec<UserPayload>,
}

impl PullRequestPayload {
    /// Whether the pull request was merged.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged.unwrap_or(false)
    }

    /// Logins of the requested reviewers, skipping entries without one.
    pub fn reviewer_logins(&self) -> impl Iterator<Item = &str> {
        self.requested_reviewers
            .iter()
            .filter_map(|reviewer| reviewer.login.as_deref())
    }
}

impl From<&PullRequestPayload> for PullRequestRef {
    fn from(payload: &PullRequestPayload) -> Self {
        Self {
            number: payload.number,
            title: payload.title.clone(),
            url: payload.html_url.clone(),
        }
    }
}

/// A `pull_request` delivery.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequestEvent {
    /// Action such as `opened` or `review_requested`.
    pub action: String,
    /// The pull request the action applies to.
    pub pull_request: PullRequestPayload,
    /// Reviewer named by a `review_requested` action.
    #[serde(default)]
    pub requested_reviewer: Option<UserPayload>,
}

/// The review inside a `pull_request_review` delivery.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReviewPayload {
    /// Review state such as `approved`.
    pub state: String,
    /// Author of the review.
    #[serde(default)]
    pub user: UserPayload,
}

/// A `pull_request_review` delivery.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequestReviewEvent {
    /// Action such as `submitted`.
    pub action: String,
    /// The submitted review.
    pub review: ReviewPayload,
    /// The reviewed pull request.
    pub pull_request: PullRequestPayload,
}

#[cfg(test)]
mod tests {
    use super::{PullRequestEvent, PullRequestReviewEvent};
    use crate::correlator::PullRequestRef;

    #[test]
    fn decodes_review_requested_delivery() {
        let event: PullRequestEvent = serde_json::from_str(
            r#"{
                "action": "review_requested",
                "number": 42,
                "pull_request": {
                    "number": 42,
                    "title": "Add widgets",
                    "html_url": "https://github.com/octo/repo/pull/42",
                    "user": { "login": "octocat" },
                    "requested_reviewers": [{ "login": "alice" }, { "slug": "core-team" }]
                },
                "requested_reviewer": { "login": "alice", "id": 1 },
                "sender": { "login": "octocat" }
            }"#,
        )
        .expect("payload should decode");

        assert_eq!(event.action, "review_requested");
        assert_eq!(
            event
                .requested_reviewer
                .and_then(|reviewer| reviewer.login)
                .as_deref(),
            Some("alice")
        );
        assert_eq!(
            event.pull_request.reviewer_logins().collect::<Vec<_>>(),
            vec!["alice"]
        );
        assert_eq!(
            PullRequestRef::from(&event.pull_request),
            PullRequestRef {
                number: 42,
                title: "Add widgets".to_owned(),
                url: "https://github.com/octo/repo/pull/42".to_owned(),
            }
        );
    }

    #[test]
    fn decodes_review_submission() {
        let event: PullRequestReviewEvent = serde_json::from_str(
            r#"{
                "action": "submitted",
                "review": { "state": "APPROVED", "user": { "login": "bob" } },
                "pull_request": { "number": 7, "merged": false }
            }"#,
        )
        .expect("payload should decode");

        assert_eq!(event.review.state, "APPROVED");
        assert_eq!(event.pull_request.title, "");
        assert!(!event.pull_request.is_merged());
    }
}
