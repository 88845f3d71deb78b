//! Repository identity wrappers and API path construction.

use url::Url;

use super::error::GitHubError;

const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    pub(crate) fn new(value: &str) -> Result<Self, GitHubError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingRepository);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    pub(crate) fn new(value: &str) -> Result<Self, GitHubError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingRepository);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Validates that the number is positive.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, GitHubError> {
        if value == 0 {
            return Err(GitHubError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Parses a number from a chat selection value such as `"42"`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidPullRequestNumber`] when the value is not
    /// a positive integer.
    pub fn parse(value: &str) -> Result<Self, GitHubError> {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| GitHubError::InvalidPullRequestNumber)
            .and_then(Self::new)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GitHubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// The watched repository together with the API base used to reach it.
///
/// # Example
///
/// ```
/// use review_police::github::RepositoryLocator;
///
/// let locator = RepositoryLocator::new("Erik142", "Team-Apricot", None)
///     .expect("should build locator");
/// assert_eq!(locator.owner().as_str(), "Erik142");
/// assert_eq!(locator.api_base().as_str(), "https://api.github.com/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Builds a locator for `owner/repo`, defaulting to the public GitHub API
    /// when no base URL is supplied.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingRepository` when owner or repo is blank
    /// and `GitHubError::InvalidUrl` when the API base cannot be parsed.
    pub fn new(owner: &str, repo: &str, api_base: Option<&str>) -> Result<Self, GitHubError> {
        let validated_owner = RepositoryOwner::new(owner)?;
        let repository = RepositoryName::new(repo)?;
        let base = api_base.unwrap_or(DEFAULT_API_BASE);
        let parsed_base =
            Url::parse(base).map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            api_base: parsed_base,
            owner: validated_owner,
            repository,
        })
    }

    /// API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    pub(crate) fn pulls_path(&self) -> String {
        format!(
            "/repos/{}/{}/pulls",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn pull_request_path(&self, number: PullRequestNumber) -> String {
        format!("{}/{}", self.pulls_path(), number.get())
    }

    pub(crate) fn requested_reviewers_path(&self, number: PullRequestNumber) -> String {
        format!("{}/requested_reviewers", self.pull_request_path(number))
    }
}
