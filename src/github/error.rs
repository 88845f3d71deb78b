//! Error types exposed by the GitHub layer.

use thiserror::Error;

/// Errors surfaced while talking to GitHub or validating GitHub inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubError {
    /// The API base URL could not be parsed.
    #[error("GitHub API URL is invalid: {0}")]
    InvalidUrl(String),

    /// A repository owner or name was empty.
    #[error("repository owner and name must both be non-empty")]
    MissingRepository,

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The authentication token was missing.
    #[error("GitHub token is required")]
    MissingToken,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },
}
