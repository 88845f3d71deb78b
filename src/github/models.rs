//! Data models representing open pull requests and their review requests.

use serde::Deserialize;

/// One (pull request, reviewer) pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    /// Pull request number.
    pub pull_number: u64,
    /// Pull request title.
    pub title: String,
    /// HTML URL of the pull request.
    pub url: String,
    /// GitHub login of the requested reviewer.
    pub reviewer: String,
}

/// Live snapshot of a pull request and its outstanding review requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Title of the pull request.
    pub title: String,
    /// HTML URL for displaying to a user.
    pub url: String,
    /// State reported by GitHub (e.g. `open`).
    pub status: String,
    /// Currently outstanding requested reviewers, one entry per login.
    pub review_requests: Vec<ReviewRequest>,
}

impl PullRequest {
    /// Builds a pull request whose review requests are derived from the
    /// given reviewer logins, dropping duplicates.
    #[must_use]
    pub fn new(
        number: u64,
        title: impl Into<String>,
        url: impl Into<String>,
        status: impl Into<String>,
        reviewers: &[&str],
    ) -> Self {
        let title_text = title.into();
        let url_text = url.into();
        let mut review_requests: Vec<ReviewRequest> = Vec::with_capacity(reviewers.len());
        for reviewer in reviewers {
            if review_requests
                .iter()
                .any(|existing| existing.reviewer == *reviewer)
            {
                continue;
            }
            review_requests.push(ReviewRequest {
                pull_number: number,
                title: title_text.clone(),
                url: url_text.clone(),
                reviewer: (*reviewer).to_owned(),
            });
        }

        Self {
            number,
            title: title_text,
            url: url_text,
            status: status.into(),
            review_requests,
        }
    }

    /// Logins of the outstanding requested reviewers, in request order.
    pub fn reviewers(&self) -> impl Iterator<Item = &str> {
        self.review_requests
            .iter()
            .map(|request| request.reviewer.as_str())
    }

    /// Whether `login` is currently a requested reviewer.
    #[must_use]
    pub fn is_requested(&self, login: &str) -> bool {
        self.reviewers().any(|reviewer| reviewer == login)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiPullRequest {
    pub(super) number: u64,
    pub(super) title: Option<String>,
    pub(super) state: Option<String>,
    pub(super) html_url: Option<String>,
    #[serde(default)]
    pub(super) requested_reviewers: Vec<ApiUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(value: ApiPullRequest) -> Self {
        let logins: Vec<String> = value
            .requested_reviewers
            .into_iter()
            .filter_map(|user| user.login)
            .collect();
        let borrowed: Vec<&str> = logins.iter().map(String::as_str).collect();

        Self::new(
            value.number,
            value.title.unwrap_or_default(),
            value.html_url.unwrap_or_default(),
            value.state.unwrap_or_default(),
            &borrowed,
        )
    }
}
