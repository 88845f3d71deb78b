//! Octocrab implementation of the pull request source.

use async_trait::async_trait;
use http::Uri;
use octocrab::{Octocrab, Page};
use serde::Serialize;

use crate::github::error::GitHubError;
use crate::github::locator::{PersonalAccessToken, PullRequestNumber, RepositoryLocator};
use crate::github::models::{ApiPullRequest, PullRequest};

use super::PullRequestSource;
use super::client::build_octocrab_client;
use super::error_mapping::{is_auth_failure, is_not_found, map_octocrab_error};

const OPEN_PULLS_PER_PAGE: &str = "100";

#[derive(Debug, Serialize)]
struct RemoveReviewersBody<'a> {
    reviewers: &'a [String],
}

/// Octocrab-backed pull request source for one repository.
pub struct OctocrabPullRequestSource {
    client: Octocrab,
    locator: RepositoryLocator,
}

impl OctocrabPullRequestSource {
    /// Creates a source from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab, locator: RepositoryLocator) -> Self {
        Self { client, locator }
    }

    /// Builds an Octocrab client for the given token and repository.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed or
    /// `GitHubError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &PersonalAccessToken,
        locator: RepositoryLocator,
    ) -> Result<Self, GitHubError> {
        let octocrab = build_octocrab_client(token, locator.api_base().as_str())?;
        Ok(Self::new(octocrab, locator))
    }
}

#[async_trait]
impl PullRequestSource for OctocrabPullRequestSource {
    async fn list_open_pull_requests(&self) -> Result<Vec<PullRequest>, GitHubError> {
        let query_params = [("state", "open"), ("per_page", OPEN_PULLS_PER_PAGE)];
        let first_page: Page<ApiPullRequest> = self
            .client
            .get(self.locator.pulls_path(), Some(&query_params))
            .await
            .map_err(|error| map_octocrab_error("list open pulls", &error))?;

        self.client
            .all_pages(first_page)
            .await
            .map(|pulls| pulls.into_iter().map(ApiPullRequest::into).collect())
            .map_err(|error| map_octocrab_error("list open pulls", &error))
    }

    async fn pull_request(
        &self,
        number: PullRequestNumber,
    ) -> Result<Option<PullRequest>, GitHubError> {
        match self
            .client
            .get::<ApiPullRequest, _, _>(self.locator.pull_request_path(number), None::<&()>)
            .await
        {
            Ok(api) => Ok(Some(api.into())),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(map_octocrab_error("pull request", &error)),
        }
    }

    async fn delete_requested_reviewers(
        &self,
        number: PullRequestNumber,
        reviewers: &[String],
    ) -> Result<bool, GitHubError> {
        let uri: Uri = self
            .locator
            .requested_reviewers_path(number)
            .parse::<Uri>()
            .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;
        let body = RemoveReviewersBody { reviewers };

        let status = match self.client._delete(uri, Some(&body)).await {
            Ok(response) => response.status(),
            Err(octocrab::Error::GitHub { source, .. }) if !is_auth_failure(source.status_code) => {
                source.status_code
            }
            Err(error) => return Err(map_octocrab_error("remove requested reviewers", &error)),
        };

        if !status.is_success() {
            tracing::warn!(
                pull_number = number.get(),
                %status,
                "GitHub refused to remove requested reviewers"
            );
        }
        Ok(status.is_success())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::OctocrabPullRequestSource;
    use crate::github::gateway::PullRequestSource;
    use crate::github::locator::{PersonalAccessToken, PullRequestNumber, RepositoryLocator};

    #[fixture]
    fn token() -> PersonalAccessToken {
        PersonalAccessToken::new("valid-token").expect("token should be valid")
    }

    fn source_for(server: &MockServer, token: &PersonalAccessToken) -> OctocrabPullRequestSource {
        let locator = RepositoryLocator::new("owner", "repo", Some(&server.uri()))
            .expect("should create repository locator");
        OctocrabPullRequestSource::for_token(token, locator).expect("should create source")
    }

    fn number(value: u64) -> PullRequestNumber {
        PullRequestNumber::new(value).expect("number should be positive")
    }

    #[rstest]
    #[tokio::test]
    async fn list_open_pull_requests_maps_requested_reviewers(token: PersonalAccessToken) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls"))
            .and(query_param("state", "open"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "number": 10,
                    "title": "Add login page",
                    "state": "open",
                    "html_url": "https://github.com/owner/repo/pull/10",
                    "requested_reviewers": [{ "login": "alice" }, { "login": "bob" }]
                },
                {
                    "number": 11,
                    "title": "Fix typo",
                    "state": "open",
                    "html_url": "https://github.com/owner/repo/pull/11",
                    "requested_reviewers": []
                }
            ])))
            .mount(&server)
            .await;

        let source = source_for(&server, &token);
        let pulls = source
            .list_open_pull_requests()
            .await
            .expect("listing should succeed");

        assert_eq!(pulls.len(), 2, "expected both pull requests");
        let first = pulls.first().expect("first pull request");
        assert_eq!(first.reviewers().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert_eq!(first.review_requests.len(), 2);
        assert!(
            pulls
                .get(1)
                .is_some_and(|pull| pull.review_requests.is_empty()),
            "second pull request should have no review requests"
        );
    }

    #[rstest]
    #[tokio::test]
    async fn pull_request_returns_none_for_missing_pull(token: PersonalAccessToken) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/owner/repo/pulls/55"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            })))
            .mount(&server)
            .await;

        let source = source_for(&server, &token);
        let result = source
            .pull_request(number(55))
            .await
            .expect("missing pull request is not an error");

        assert!(result.is_none(), "expected None, got {result:?}");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_requested_reviewers_sends_logins(token: PersonalAccessToken) {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/repos/owner/repo/pulls/10/requested_reviewers"))
            .and(body_json(json!({ "reviewers": ["bob", "carol"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "number": 10 })))
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(&server, &token);
        let removed = source
            .delete_requested_reviewers(number(10), &["bob".to_owned(), "carol".to_owned()])
            .await
            .expect("request should complete");

        assert!(removed, "200 response should report success");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_requested_reviewers_reports_refusal(token: PersonalAccessToken) {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/repos/owner/repo/pulls/10/requested_reviewers"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Reviews may only be requested from collaborators."
            })))
            .mount(&server)
            .await;

        let source = source_for(&server, &token);
        let removed = source
            .delete_requested_reviewers(number(10), &["bob".to_owned()])
            .await
            .expect("request should complete");

        assert!(!removed, "422 response should report failure");
    }
}
