//! Unit tests for review request classification.

use mockall::predicate::always;
use rstest::{fixture, rstest};

use super::{
    ReviewRequestClassifier, ReviewRequestView, accepted_review_requests, all_review_requests,
    format_review_requests, unaccepted_review_requests,
};
use crate::github::gateway::MockPullRequestSource;
use crate::github::models::PullRequest;

fn pull(number: u64, reviewers: &[&str]) -> PullRequest {
    PullRequest::new(
        number,
        format!("PR {number}"),
        format!("https://github.com/octo/repo/pull/{number}"),
        "open",
        reviewers,
    )
}

#[fixture]
fn open_pulls() -> Vec<PullRequest> {
    vec![
        pull(1, &["alice"]),
        pull(2, &["alice", "bob"]),
        pull(3, &["bob"]),
        pull(4, &[]),
        pull(5, &["carol", "alice", "dave"]),
    ]
}

fn numbers(requests: &[super::ReviewRequest]) -> Vec<u64> {
    requests.iter().map(|request| request.pull_number).collect()
}

#[rstest]
fn all_collects_every_request_for_user(open_pulls: Vec<PullRequest>) {
    let requests = all_review_requests(&open_pulls, "alice");
    assert_eq!(numbers(&requests), vec![1, 2, 5]);
    assert!(
        requests.iter().all(|request| request.reviewer == "alice"),
        "every request should name alice"
    );
}

#[rstest]
fn accepted_requires_sole_reviewer(open_pulls: Vec<PullRequest>) {
    assert_eq!(numbers(&accepted_review_requests(&open_pulls, "alice")), vec![1]);
    assert_eq!(numbers(&accepted_review_requests(&open_pulls, "bob")), vec![3]);
    assert!(accepted_review_requests(&open_pulls, "carol").is_empty());
}

#[rstest]
fn unaccepted_requires_other_reviewers(open_pulls: Vec<PullRequest>) {
    assert_eq!(
        numbers(&unaccepted_review_requests(&open_pulls, "alice")),
        vec![2, 5]
    );
    assert_eq!(numbers(&unaccepted_review_requests(&open_pulls, "bob")), vec![2]);
}

#[rstest]
#[case::all(ReviewRequestView::All)]
#[case::accepted(ReviewRequestView::Accepted)]
#[case::unaccepted(ReviewRequestView::Unaccepted)]
fn pull_without_reviewers_contributes_nothing(#[case] view: ReviewRequestView) {
    let pulls = vec![pull(4, &[])];
    assert!(view.select(&pulls, "alice").is_empty());
    assert!(view.select(&pulls, "").is_empty());
}

#[rstest]
fn accepted_and_unaccepted_partition_all(open_pulls: Vec<PullRequest>) {
    for user in ["alice", "bob", "carol", "dave", "erin"] {
        let all = all_review_requests(&open_pulls, user);
        let accepted = accepted_review_requests(&open_pulls, user);
        let unaccepted = unaccepted_review_requests(&open_pulls, user);
        assert_eq!(
            accepted.len() + unaccepted.len(),
            all.len(),
            "views should partition the requests of {user}"
        );
    }
}

#[rstest]
#[case("", ReviewRequestView::All)]
#[case("all", ReviewRequestView::All)]
#[case("Accepted", ReviewRequestView::Accepted)]
#[case(" unaccepted ", ReviewRequestView::Unaccepted)]
fn parses_view_names(#[case] input: &str, #[case] expected: ReviewRequestView) {
    assert_eq!(input.parse::<ReviewRequestView>(), Ok(expected));
}

#[rstest]
fn rejects_unknown_view_name() {
    assert!("pending".parse::<ReviewRequestView>().is_err());
}

#[rstest]
fn empty_reply_names_the_view() {
    let reply = format_review_requests(&[], ReviewRequestView::Unaccepted);
    assert!(
        reply.contains("You have no unaccepted review requests."),
        "unexpected reply: {reply}"
    );
    let all_reply = format_review_requests(&[], ReviewRequestView::All);
    assert!(
        all_reply.contains("You have no review requests."),
        "unexpected reply: {all_reply}"
    );
}

#[rstest]
fn reply_lists_each_request(open_pulls: Vec<PullRequest>) {
    let requests = all_review_requests(&open_pulls, "bob");
    let reply = format_review_requests(&requests, ReviewRequestView::All);
    insta::assert_snapshot!(reply, @r"
    #2: PR 2 https://github.com/octo/repo/pull/2
    #3: PR 3 https://github.com/octo/repo/pull/3
    ");
}

#[rstest]
#[tokio::test]
async fn classifier_refetches_on_every_call(open_pulls: Vec<PullRequest>) {
    let mut source = MockPullRequestSource::new();
    source
        .expect_list_open_pull_requests()
        .times(2)
        .returning(move || Ok(open_pulls.clone()));
    source.expect_pull_request().with(always()).never();

    let classifier = ReviewRequestClassifier::new(&source);
    let accepted = classifier
        .accepted("alice")
        .await
        .expect("classification should succeed");
    let unaccepted = classifier
        .unaccepted("alice")
        .await
        .expect("classification should succeed");

    assert_eq!(numbers(&accepted), vec![1]);
    assert_eq!(numbers(&unaccepted), vec![2, 5]);
}
