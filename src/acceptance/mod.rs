//! Review acceptance: a reviewer takes a pull request off everyone else's
//! plate.
//!
//! Accepting a pull request removes every *other* requested reviewer. The
//! actor's own request stays in place, which is what later makes the
//! request show up as "accepted" in the classifier views. Each selected pull
//! request is handled on its own and in order, so a failure on one item never
//! aborts the rest of the batch.

use std::sync::Arc;

use crate::chat::{
    COURT_DUTY_TITLE, ChatSink, DESCRIPTION_LIMIT, MentionResolver, Notification,
    SelectionResponder, hyperlink,
};
use crate::correlator::PullRequestRef;
use crate::github::{PullRequest, PullRequestNumber, PullRequestSource};
use crate::notifications::deliver;

/// Room kept for the note about sections that did not fit.
const OVERFLOW_RESERVE: usize = 64;

const ALREADY_SOLE_LINE: &str = "Trying to work double shifts, eh? You have already accepted \
                                 this request review, try another one.";
const NOT_REQUESTED_LINE: &str = "Trying to bail your friends out of review duty, huh? Not \
                                  gonna happen this time. Your review has not been requested \
                                  for this pull request, try another one.";
const REMOVAL_FAILED_LINE: &str = "Your friends could not be bailed out of review duty this \
                                   time. Something went wrong when trying to remove other \
                                   reviewers from the pull request. Try again or do it manually \
                                   in GitHub.";

/// Result of accepting one selected pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// The other reviewers were removed.
    Success {
        /// Logins removed from the requested-reviewer list.
        removed: Vec<String>,
    },
    /// The selection does not name an existing pull request.
    NotFound,
    /// The actor is not a requested reviewer of the pull request.
    NotRequested,
    /// The actor already is the only requested reviewer; nothing changed.
    AlreadySole,
    /// GitHub did not confirm the removal.
    RemovalFailed,
}

impl AcceptOutcome {
    /// Whether the item ended in a successful removal.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Outcome of one selection, with the line shown to the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    /// Raw selection value as submitted.
    pub selection: String,
    /// Pull request the selection resolved to, when it exists.
    pub pull_request: Option<PullRequestRef>,
    /// What happened.
    pub outcome: AcceptOutcome,
    /// Human-readable description of the outcome.
    pub line: String,
}

/// Everything an acceptance batch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceReport {
    /// Per-selection results, in selection order.
    pub items: Vec<ItemResult>,
    /// Text sent to the selection interaction.
    pub acknowledgement: String,
    /// Batched channel notification, present when any item succeeded.
    pub notification: Option<Notification>,
}

impl AcceptanceReport {
    /// Outcomes in selection order.
    pub fn outcomes(&self) -> impl Iterator<Item = &AcceptOutcome> {
        self.items.iter().map(|item| &item.outcome)
    }
}

/// Acknowledgement for a selection of `count` pull requests.
#[must_use]
pub fn acknowledgement(count: usize) -> String {
    let subject = if count > 1 { "PRs have" } else { "PR has" };
    format!("{subject} been selected. Use /accept again to select more PRs.")
}

/// Runs acceptance batches against GitHub and reports to chat.
#[derive(Clone)]
pub struct ReviewAcceptance {
    source: Arc<dyn PullRequestSource>,
    mentions: MentionResolver,
    sink: Arc<dyn ChatSink>,
}

impl ReviewAcceptance {
    /// Creates the workflow over its collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn PullRequestSource>,
        mentions: MentionResolver,
        sink: Arc<dyn ChatSink>,
    ) -> Self {
        Self {
            source,
            mentions,
            sink,
        }
    }

    /// Accepts each selected pull request on behalf of the chat user
    /// `actor`.
    ///
    /// The acknowledgement is always sent through `responder`. One
    /// notification summarising the successful items is posted to the
    /// channel after the whole batch, and only if something succeeded.
    pub async fn accept(
        &self,
        actor: &str,
        selections: &[String],
        responder: &dyn SelectionResponder,
    ) -> AcceptanceReport {
        let login = self.mentions.identities().github_login_for(actor);
        if login.is_none() {
            tracing::warn!(actor, "acceptance requested by a chat user with no GitHub mapping");
        }

        let mut items = Vec::with_capacity(selections.len());
        for selection in selections {
            items.push(self.accept_one(actor, login, selection).await);
        }

        let acknowledgement = acknowledgement(selections.len());
        if let Err(error) = responder.acknowledge(&acknowledgement).await {
            tracing::warn!(actor, %error, "failed to acknowledge selection");
        }

        let notification = batched_notification(&items);
        if let Some(batched) = &notification {
            deliver(self.sink.as_ref(), batched).await;
        }

        tracing::info!(
            actor,
            selected = items.len(),
            succeeded = items.iter().filter(|item| item.outcome.is_success()).count(),
            "acceptance batch processed"
        );

        AcceptanceReport {
            items,
            acknowledgement,
            notification,
        }
    }

    async fn accept_one(&self, actor: &str, login: Option<&str>, selection: &str) -> ItemResult {
        let Some(pull_request) = self.fetch(selection).await else {
            return ItemResult {
                selection: selection.to_owned(),
                pull_request: None,
                outcome: AcceptOutcome::NotFound,
                line: format!(
                    "I don't know what you're going on about... Come on, get on out of here! The \
                     pull request with number {} does not exist!",
                    selection.trim()
                ),
            };
        };

        let outcome = match login {
            Some(login) => self.remove_other_reviewers(&pull_request, login).await,
            None => AcceptOutcome::NotRequested,
        };
        let line = self.describe(actor, &outcome).await;

        ItemResult {
            selection: selection.to_owned(),
            pull_request: Some(PullRequestRef::from(&pull_request)),
            outcome,
            line,
        }
    }

    async fn fetch(&self, selection: &str) -> Option<PullRequest> {
        let number = match PullRequestNumber::parse(selection) {
            Ok(number) => number,
            Err(error) => {
                tracing::debug!(selection, %error, "selection is not a pull request number");
                return None;
            }
        };

        match self.source.pull_request(number).await {
            Ok(found) => found,
            Err(error) => {
                tracing::warn!(pull_number = number.get(), %error, "failed to fetch pull request");
                None
            }
        }
    }

    async fn remove_other_reviewers(
        &self,
        pull_request: &PullRequest,
        login: &str,
    ) -> AcceptOutcome {
        if !pull_request.is_requested(login) {
            return AcceptOutcome::NotRequested;
        }

        let remaining: Vec<String> = pull_request
            .reviewers()
            .filter(|reviewer| *reviewer != login)
            .map(str::to_owned)
            .collect();
        if remaining.is_empty() {
            return AcceptOutcome::AlreadySole;
        }

        let Ok(number) = PullRequestNumber::new(pull_request.number) else {
            return AcceptOutcome::RemovalFailed;
        };
        match self.source.delete_requested_reviewers(number, &remaining).await {
            Ok(true) => AcceptOutcome::Success { removed: remaining },
            Ok(false) => AcceptOutcome::RemovalFailed,
            Err(error) => {
                tracing::warn!(pull_number = number.get(), %error, "failed to remove reviewers");
                AcceptOutcome::RemovalFailed
            }
        }
    }

    async fn describe(&self, actor: &str, outcome: &AcceptOutcome) -> String {
        match outcome {
            AcceptOutcome::Success { removed } => {
                let removed_mentions = self
                    .mentions
                    .mention_logins(removed.iter().map(String::as_str))
                    .await;
                let actor_mention = self.mentions.mention_chat_user(actor).await;
                format!(
                    "{removed_mentions}: {actor_mention} has bailed you out of review duty. I'll \
                     catch you next time 🚓"
                )
            }
            AcceptOutcome::NotRequested => NOT_REQUESTED_LINE.to_owned(),
            AcceptOutcome::AlreadySole => ALREADY_SOLE_LINE.to_owned(),
            AcceptOutcome::RemovalFailed => REMOVAL_FAILED_LINE.to_owned(),
            AcceptOutcome::NotFound => String::new(),
        }
    }
}

fn batched_notification(items: &[ItemResult]) -> Option<Notification> {
    let successes: Vec<(&PullRequestRef, &str)> = items
        .iter()
        .filter(|item| item.outcome.is_success())
        .filter_map(|item| {
            item.pull_request
                .as_ref()
                .map(|pull_request| (pull_request, item.line.as_str()))
        })
        .collect();

    let sections: Vec<String> = successes
        .iter()
        .map(|(pull_request, line)| {
            let link = hyperlink(
                &format!("#{}: {}", pull_request.number, pull_request.title),
                &pull_request.url,
            );
            format!("{link}\n{line}")
        })
        .collect();
    let description = fit_description(&sections);

    match successes.as_slice() {
        [] => None,
        [(only, _)] => Some(Notification::new(COURT_DUTY_TITLE, description).with_url(&only.url)),
        _ => Some(Notification::new(COURT_DUTY_TITLE, description)),
    }
}

/// Joins `sections` with blank lines, dropping trailing sections that would
/// push the text past [`DESCRIPTION_LIMIT`] and noting how many were left
/// out.
fn fit_description(sections: &[String]) -> String {
    let budget = DESCRIPTION_LIMIT.saturating_sub(OVERFLOW_RESERVE);
    let mut description = String::new();
    let mut used = 0;

    for (index, section) in sections.iter().enumerate() {
        let separator = if description.is_empty() { "" } else { "\n\n" };
        let needed = separator.len() + section.chars().count();
        if used + needed > budget {
            if description.is_empty() {
                description = section.chars().take(budget).collect();
            }
            let omitted = sections.len() - index - usize::from(used == 0);
            if omitted > 0 {
                description.push_str(&format!(
                    "\n\n...and {omitted} more accepted pull request(s)."
                ));
            }
            return description;
        }
        description.push_str(separator);
        description.push_str(section);
        used += needed;
    }
    description
}
