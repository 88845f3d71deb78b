//! Classification of a user's review requests across open pull requests.
//!
//! A request counts as *accepted* once every other requested reviewer has
//! been removed from the pull request, leaving the user as the sole remaining
//! reviewer. Requests on pull requests that still list several reviewers are
//! *unaccepted*.

use std::fmt;
use std::str::FromStr;

use super::error::GitHubError;
use super::gateway::PullRequestSource;
use super::models::{PullRequest, ReviewRequest};

/// Which slice of a user's review requests to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewRequestView {
    /// Every outstanding request for the user.
    #[default]
    All,
    /// Requests where the user is the only remaining reviewer.
    Accepted,
    /// Requests shared with at least one other reviewer.
    Unaccepted,
}

impl ReviewRequestView {
    /// Lower-case label used in configuration and replies.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Accepted => "accepted",
            Self::Unaccepted => "unaccepted",
        }
    }

    /// Applies this view to a snapshot of open pull requests.
    #[must_use]
    pub fn select(self, pull_requests: &[PullRequest], username: &str) -> Vec<ReviewRequest> {
        match self {
            Self::All => all_review_requests(pull_requests, username),
            Self::Accepted => accepted_review_requests(pull_requests, username),
            Self::Unaccepted => unaccepted_review_requests(pull_requests, username),
        }
    }
}

impl fmt::Display for ReviewRequestView {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

/// Error returned when a view name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown review request view '{0}' (expected all, accepted or unaccepted)")]
pub struct UnknownViewError(pub String);

impl FromStr for ReviewRequestView {
    type Err = UnknownViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "accepted" => Ok(Self::Accepted),
            "unaccepted" => Ok(Self::Unaccepted),
            other => Err(UnknownViewError(other.to_owned())),
        }
    }
}

/// Every review request addressed to `username`.
#[must_use]
pub fn all_review_requests(pull_requests: &[PullRequest], username: &str) -> Vec<ReviewRequest> {
    pull_requests
        .iter()
        .flat_map(|pull_request| pull_request.review_requests.iter())
        .filter(|request| request.reviewer == username)
        .cloned()
        .collect()
}

/// Requests on pull requests whose only requested reviewer is `username`.
#[must_use]
pub fn accepted_review_requests(
    pull_requests: &[PullRequest],
    username: &str,
) -> Vec<ReviewRequest> {
    pull_requests
        .iter()
        .filter_map(|pull_request| match pull_request.review_requests.as_slice() {
            [only] if only.reviewer == username => Some(only.clone()),
            _ => None,
        })
        .collect()
}

/// Requests for `username` on pull requests that list more than one reviewer.
#[must_use]
pub fn unaccepted_review_requests(
    pull_requests: &[PullRequest],
    username: &str,
) -> Vec<ReviewRequest> {
    pull_requests
        .iter()
        .filter(|pull_request| pull_request.review_requests.len() > 1)
        .flat_map(|pull_request| pull_request.review_requests.iter())
        .filter(|request| request.reviewer == username)
        .cloned()
        .collect()
}

/// Fetches open pull requests and classifies the review requests they carry.
///
/// Nothing is cached: each call re-reads the remote state.
pub struct ReviewRequestClassifier<'source, Source>
where
    Source: PullRequestSource + ?Sized,
{
    source: &'source Source,
}

impl<'source, Source> ReviewRequestClassifier<'source, Source>
where
    Source: PullRequestSource + ?Sized,
{
    /// Create a classifier over the given source.
    #[must_use]
    pub const fn new(source: &'source Source) -> Self {
        Self { source }
    }

    /// Review requests for `username` in the requested view.
    ///
    /// # Errors
    ///
    /// Propagates any failure from listing open pull requests.
    pub async fn review_requests(
        &self,
        username: &str,
        view: ReviewRequestView,
    ) -> Result<Vec<ReviewRequest>, GitHubError> {
        let pull_requests = self.source.list_open_pull_requests().await?;
        Ok(view.select(&pull_requests, username))
    }

    /// Every request for `username`.
    ///
    /// # Errors
    ///
    /// Propagates any failure from listing open pull requests.
    pub async fn all(&self, username: &str) -> Result<Vec<ReviewRequest>, GitHubError> {
        self.review_requests(username, ReviewRequestView::All).await
    }

    /// Requests where `username` is the sole remaining reviewer.
    ///
    /// # Errors
    ///
    /// Propagates any failure from listing open pull requests.
    pub async fn accepted(&self, username: &str) -> Result<Vec<ReviewRequest>, GitHubError> {
        self.review_requests(username, ReviewRequestView::Accepted)
            .await
    }

    /// Requests `username` still shares with other reviewers.
    ///
    /// # Errors
    ///
    /// Propagates any failure from listing open pull requests.
    pub async fn unaccepted(&self, username: &str) -> Result<Vec<ReviewRequest>, GitHubError> {
        self.review_requests(username, ReviewRequestView::Unaccepted)
            .await
    }
}

/// Formats the reply listing `requests` for the given view.
#[must_use]
pub fn format_review_requests(requests: &[ReviewRequest], view: ReviewRequestView) -> String {
    if requests.is_empty() {
        let qualifier = match view {
            ReviewRequestView::All => String::new(),
            ReviewRequestView::Accepted | ReviewRequestView::Unaccepted => {
                format!("{} ", view.label())
            }
        };
        return format!(
            "You are free to leave, for now... You have no {qualifier}review requests. \
             I will catch you later 🚓"
        );
    }

    requests
        .iter()
        .map(|request| {
            format!(
                "#{number}: {title} {url}",
                number = request.pull_number,
                title = request.title,
                url = request.url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests;
