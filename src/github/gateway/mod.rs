//! Gateways for reading and mutating pull requests through Octocrab.
//!
//! The trait-based design enables mocking in tests while the Octocrab
//! implementation handles real HTTP requests.

mod client;
mod error_mapping;
mod pull_request;

pub use pull_request::OctocrabPullRequestSource;

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::PullRequestNumber;
use crate::github::models::PullRequest;

/// Live source of pull requests for the watched repository.
///
/// Implementations never cache: every call reflects the current remote state.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// List every open pull request.
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>, GitHubError>;

    /// Fetch one pull request, returning `None` when it does not exist.
    async fn pull_request(
        &self,
        number: PullRequestNumber,
    ) -> Result<Option<PullRequest>, GitHubError>;

    /// Remove the given logins from the pull request's requested reviewers.
    ///
    /// Returns whether GitHub reported the removal as successful.
    async fn delete_requested_reviewers(
        &self,
        number: PullRequestNumber,
        reviewers: &[String],
    ) -> Result<bool, GitHubError>;
}
