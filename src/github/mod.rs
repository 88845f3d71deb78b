//! GitHub pull request access and review request classification.
//!
//! This module wraps Octocrab to list open pull requests, fetch a single pull
//! request and remove requested reviewers. Errors are mapped into
//! user-friendly variants so that callers can surface precise failures
//! without exposing Octocrab internals.

pub mod classifier;
pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use classifier::{ReviewRequestClassifier, ReviewRequestView, format_review_requests};
pub use error::GitHubError;
pub use gateway::{OctocrabPullRequestSource, PullRequestSource};
pub use locator::{PersonalAccessToken, PullRequestNumber, RepositoryLocator};
pub use models::{PullRequest, ReviewRequest};

#[cfg(any(test, feature = "test-support"))]
pub use gateway::MockPullRequestSource;
