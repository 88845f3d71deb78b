//! Review Police: a GitHub to Discord review-request bot.
//!
//! The library receives GitHub webhook deliveries, batches review requests
//! raised while a pull request is being opened into a single chat summons,
//! announces merges, closures and review verdicts, and lets a reviewer
//! accept a review request by removing every other requested reviewer.

pub mod acceptance;
pub mod chat;
pub mod config;
pub mod correlator;
pub mod error;
pub mod github;
pub mod identity;
pub mod notifications;
pub mod webhook;

pub use acceptance::{AcceptOutcome, AcceptanceReport, ReviewAcceptance};
pub use config::{OperationMode, ReviewPoliceConfig};
pub use correlator::{CorrelatorSettings, NotificationCorrelator};
pub use error::AppError;
pub use github::{GitHubError, OctocrabPullRequestSource, PullRequestSource};
pub use identity::{IdentityError, IdentityMapper};
pub use webhook::{Dispatcher, DispatcherBuilder, WebhookError};
