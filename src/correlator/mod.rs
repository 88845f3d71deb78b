//! Batches review-request bursts into one notification per pull request.
//!
//! GitHub's auto-assignment fires one `review_requested` delivery per
//! assigned reviewer right after a pull request is opened. The correlator
//! tracks pull requests from `opened` onwards, collects the reviewers named
//! during a fixed grace window, and emits a single combined summons when the
//! window closes. Requests for pull requests that are not tracked are emitted
//! immediately on their own.
//!
//! Every entry lives in one map behind a `tokio` mutex. The grace-window task
//! removes its entry under the same lock, so a late delivery either joins the
//! batch before it is taken or is treated as an ad hoc request afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::github::PullRequest;

/// Default delay between the first reviewer sighting and the combined
/// notification.
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_millis(5000);

/// Default lifetime of an entry that never sees a reviewer.
pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(600);

/// Display context of the pull request a summons is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// Pull request number.
    pub number: u64,
    /// Title at the time of the delivery.
    pub title: String,
    /// HTML URL of the pull request.
    pub url: String,
}

impl From<&PullRequest> for PullRequestRef {
    fn from(pull_request: &PullRequest) -> Self {
        Self {
            number: pull_request.number,
            title: pull_request.title.clone(),
            url: pull_request.url.clone(),
        }
    }
}

/// A request for one or more reviewers to look at a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummons {
    /// Pull request being reviewed.
    pub pull_request: PullRequestRef,
    /// GitHub logins of the summoned reviewers, in first-seen order.
    pub reviewers: Vec<String>,
}

/// Receives summonses once the correlator decides to send them.
#[async_trait]
pub trait SummonsEmitter: Send + Sync {
    /// Deliver the summons; failures are the emitter's to log.
    async fn emit(&self, summons: ReviewSummons);
}

/// Timing knobs for the correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelatorSettings {
    /// Delay from the first reviewer sighting to the combined notification.
    pub grace_window: Duration,
    /// Age after which an entry without reviewers is discarded.
    pub pending_ttl: Duration,
}

impl Default for CorrelatorSettings {
    fn default() -> Self {
        Self {
            grace_window: DEFAULT_GRACE_WINDOW,
            pending_ttl: DEFAULT_PENDING_TTL,
        }
    }
}

/// What the correlator did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    /// `opened` created a new entry.
    Tracked,
    /// `opened` found an entry already present.
    AlreadyTracked,
    /// The first reviewer arrived and the grace window started.
    WindowStarted,
    /// A reviewer joined a running grace window.
    Joined,
    /// The pull request was not tracked; the reviewer was summoned at once.
    AdHoc,
}

/// Observable state of a tracked pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingState {
    /// Opened, no reviewers seen yet.
    New,
    /// Reviewers are being collected while the grace window runs.
    Accumulating {
        /// Reviewers collected so far.
        reviewers: Vec<String>,
    },
}

#[derive(Debug)]
struct PendingNotification {
    pull_request: PullRequestRef,
    reviewers_seen: Vec<String>,
    created_at: Instant,
    window: u64,
}

impl PendingNotification {
    fn new(pull_request: PullRequestRef, window: u64) -> Self {
        Self {
            pull_request,
            reviewers_seen: Vec::new(),
            created_at: Instant::now(),
            window,
        }
    }

    fn state(&self) -> PendingState {
        if self.reviewers_seen.is_empty() {
            PendingState::New
        } else {
            PendingState::Accumulating {
                reviewers: self.reviewers_seen.clone(),
            }
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    by_number: HashMap<u64, PendingNotification>,
    next_window: u64,
}

impl Entries {
    fn sweep_expired(&mut self, ttl: Duration) {
        let now = Instant::now();
        self.by_number.retain(|number, entry| {
            let expired =
                entry.reviewers_seen.is_empty() && now.duration_since(entry.created_at) >= ttl;
            if expired {
                tracing::debug!(pull_number = number, "discarding idle pull request entry");
            }
            !expired
        });
    }

    const fn allocate_window(&mut self) -> u64 {
        self.next_window = self.next_window.wrapping_add(1);
        self.next_window
    }
}

struct Shared {
    entries: Mutex<Entries>,
    emitter: Arc<dyn SummonsEmitter>,
    settings: CorrelatorSettings,
}

/// Per-pull-request deduplication of review-request notifications.
///
/// Cloning yields another handle onto the same state.
#[derive(Clone)]
pub struct NotificationCorrelator {
    shared: Arc<Shared>,
}

impl NotificationCorrelator {
    /// Creates a correlator that hands finished summonses to `emitter`.
    #[must_use]
    pub fn new(emitter: Arc<dyn SummonsEmitter>, settings: CorrelatorSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                entries: Mutex::new(Entries::default()),
                emitter,
                settings,
            }),
        }
    }

    /// Records that a pull request was opened.
    pub async fn opened(&self, pull_request: PullRequestRef) -> Correlation {
        let mut entries = self.shared.entries.lock().await;
        entries.sweep_expired(self.shared.settings.pending_ttl);

        if entries.by_number.contains_key(&pull_request.number) {
            return Correlation::AlreadyTracked;
        }

        let number = pull_request.number;
        let window = entries.allocate_window();
        entries
            .by_number
            .insert(number, PendingNotification::new(pull_request, window));
        tracing::debug!(pull_number = number, "tracking newly opened pull request");
        Correlation::Tracked
    }

    /// Records that `reviewer` was requested on a pull request.
    ///
    /// Untracked pull requests produce an immediate single-reviewer summons,
    /// which is awaited before returning.
    pub async fn review_requested(
        &self,
        pull_request: PullRequestRef,
        reviewer: &str,
    ) -> Correlation {
        let correlation = {
            let mut entries = self.shared.entries.lock().await;
            entries.sweep_expired(self.shared.settings.pending_ttl);

            match entries.by_number.get_mut(&pull_request.number) {
                Some(entry) => {
                    entry.pull_request = pull_request.clone();
                    if entry.reviewers_seen.iter().any(|seen| seen == reviewer) {
                        Correlation::Joined
                    } else {
                        entry.reviewers_seen.push(reviewer.to_owned());
                        if entry.reviewers_seen.len() == 1 {
                            self.start_grace_window(entry.pull_request.number, entry.window);
                            Correlation::WindowStarted
                        } else {
                            Correlation::Joined
                        }
                    }
                }
                _ => Correlation::AdHoc,
            }
        };

        if correlation == Correlation::AdHoc {
            tracing::info!(
                pull_number = pull_request.number,
                reviewer,
                "summoning reviewer outside an opening burst"
            );
            self.shared
                .emitter
                .emit(ReviewSummons {
                    pull_request,
                    reviewers: vec![reviewer.to_owned()],
                })
                .await;
        }

        correlation
    }

    /// Current state for a pull request, or `None` when it is not tracked.
    pub async fn pending(&self, number: u64) -> Option<PendingState> {
        self.shared
            .entries
            .lock()
            .await
            .by_number
            .get(&number)
            .map(PendingNotification::state)
    }

    /// Number of tracked pull requests.
    pub async fn pending_count(&self) -> usize {
        self.shared.entries.lock().await.by_number.len()
    }

    fn start_grace_window(&self, number: u64, window: u64) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(shared.settings.grace_window).await;
            fire(&shared, number, window).await;
        });
    }
}

async fn fire(shared: &Shared, number: u64, window: u64) {
    let taken = {
        let mut entries = shared.entries.lock().await;
        match entries.by_number.get(&number) {
            Some(entry) if entry.window == window => entries.by_number.remove(&number),
            _ => None,
        }
    };

    let Some(entry) = taken else {
        return;
    };

    tracing::info!(
        pull_number = number,
        reviewers = entry.reviewers_seen.len(),
        "grace window closed, summoning reviewers"
    );
    shared
        .emitter
        .emit(ReviewSummons {
            pull_request: entry.pull_request,
            reviewers: entry.reviewers_seen,
        })
        .await;
}
