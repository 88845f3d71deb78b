//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.review-police.toml` in current directory,
//!    home directory, or XDG config directory
//! 3. **Environment variables** – `REVIEW_POLICE_*`, plus the conventional
//!    `GITHUB_TOKEN` as a fallback for the token
//! 4. **Command-line arguments** – `--mode`/`-M`, `--user`/`-u`, and so on
//!
//! # Configuration File
//!
//! ```toml
//! owner = "octocat"
//! repo = "hello-world"
//! webhook_secret = "change-me"
//! discord_token = "bot-token"
//! discord_channel_id = "123456789012345678"
//! product_owner = "octocat"
//! mappings_path = "account-mappings.json"
//! ```

use std::env;
use std::str::FromStr;
use std::time::Duration;

use camino::Utf8Path;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::chat::DiscordConfig;
use crate::correlator::CorrelatorSettings;
use crate::error::AppError;
use crate::github::{GitHubError, ReviewRequestView};

const DEFAULT_MAPPINGS_PATH: &str = "account-mappings.json";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_GRACE_WINDOW_MS: u64 = 5000;
const DEFAULT_PENDING_TTL_SECS: u64 = 600;

/// What the binary should do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OperationMode {
    /// Serve GitHub deliveries over HTTP.
    #[default]
    Listen,
    /// Consume deliveries from a relay channel.
    Relay,
    /// Print a user's review requests.
    Show,
    /// Accept review requests on behalf of a user.
    Accept,
}

impl FromStr for OperationMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "listen" => Ok(Self::Listen),
            "relay" => Ok(Self::Relay),
            "show" => Ok(Self::Show),
            "accept" => Ok(Self::Accept),
            other => Err(AppError::Configuration {
                message: format!(
                    "unknown mode `{other}` (expected listen, relay, show, or accept)"
                ),
            }),
        }
    }
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use review_police::ReviewPoliceConfig;
///
/// let config = ReviewPoliceConfig::load().expect("failed to load configuration");
/// let mode = config.operation_mode().expect("mode should parse");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "REVIEW_POLICE",
    discovery(
        dotfile_name = ".review-police.toml",
        config_file_name = "review-police.toml",
        app_name = "review-police"
    )
)]
pub struct ReviewPoliceConfig {
    /// Personal access token for the GitHub API.
    ///
    /// Can be provided via:
    /// - CLI: `--github-token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `REVIEW_POLICE_GITHUB_TOKEN` or `GITHUB_TOKEN`
    /// - Config file: `github_token = "..."`
    #[ortho_config(cli_short = 't')]
    pub github_token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise installations.
    #[ortho_config()]
    pub github_api_base: Option<String>,

    /// Owner of the watched repository.
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Name of the watched repository.
    #[ortho_config(cli_short = 'r')]
    pub repo: Option<String>,

    /// Shared secret configured on the GitHub webhook.
    #[ortho_config()]
    pub webhook_secret: Option<String>,

    /// Discord bot token.
    #[ortho_config()]
    pub discord_token: Option<String>,

    /// Discord channel receiving notifications.
    #[ortho_config()]
    pub discord_channel_id: Option<String>,

    /// Discord API base URL override.
    #[ortho_config()]
    pub discord_api_base: Option<String>,

    /// GitHub login of the product owner who decides on approved pull
    /// requests.
    #[ortho_config()]
    pub product_owner: Option<String>,

    /// Path of the Discord/GitHub identity mapping document.
    #[ortho_config()]
    pub mappings_path: String,

    /// Operation mode: `listen`, `relay`, `show`, or `accept`.
    ///
    /// Can be provided via:
    /// - CLI: `--mode <MODE>` or `-M <MODE>`
    /// - Environment: `REVIEW_POLICE_MODE`
    /// - Config file: `mode = "relay"`
    #[ortho_config(cli_short = 'M')]
    pub mode: Option<String>,

    /// Socket address the webhook listener binds.
    #[ortho_config()]
    pub listen_addr: String,

    /// Relay channel URL consumed in `relay` mode.
    #[ortho_config()]
    pub relay_url: Option<String>,

    /// Discord user id the `show` and `accept` modes act for.
    #[ortho_config(cli_short = 'u')]
    pub user: Option<String>,

    /// Review request view printed by `show`: `all`, `accepted`, or
    /// `unaccepted`.
    #[ortho_config()]
    pub view: Option<String>,

    /// Comma-separated pull request numbers accepted by `accept`.
    #[ortho_config(cli_short = 'P')]
    pub pulls: Option<String>,

    /// Grace window for batching review requests, in milliseconds.
    #[ortho_config()]
    pub grace_window_ms: u64,

    /// Lifetime of opened pull requests that never see a reviewer, in
    /// seconds.
    #[ortho_config()]
    pub pending_ttl_secs: u64,
}

impl Default for ReviewPoliceConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            github_api_base: None,
            owner: None,
            repo: None,
            webhook_secret: None,
            discord_token: None,
            discord_channel_id: None,
            discord_api_base: None,
            product_owner: None,
            mappings_path: DEFAULT_MAPPINGS_PATH.to_owned(),
            mode: None,
            listen_addr: DEFAULT_LISTEN_ADDR.to_owned(),
            relay_url: None,
            user: None,
            view: None,
            pulls: None,
            grace_window_ms: DEFAULT_GRACE_WINDOW_MS,
            pending_ttl_secs: DEFAULT_PENDING_TTL_SECS,
        }
    }
}

fn missing(what: &str, hint: &str) -> AppError {
    AppError::Configuration {
        message: format!("{what} is required ({hint})"),
    }
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|text| text.trim()).filter(|text| !text.is_empty())
}

impl ReviewPoliceConfig {
    /// Resolves the GitHub token from configuration or `GITHUB_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::MissingToken`] when no source provides a value.
    pub fn resolve_github_token(&self) -> Result<String, GitHubError> {
        self.github_token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
            .ok_or(GitHubError::MissingToken)
    }

    /// Parses the configured operation mode, defaulting to `listen`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] for an unknown mode.
    pub fn operation_mode(&self) -> Result<OperationMode, AppError> {
        self.mode
            .as_deref()
            .map_or(Ok(OperationMode::Listen), OperationMode::from_str)
    }

    /// Returns owner and repo if both are configured.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when owner or repo is missing.
    pub fn require_repository(&self) -> Result<(&str, &str), AppError> {
        match (present(self.owner.as_ref()), present(self.repo.as_ref())) {
            (Some(owner), Some(repo)) => Ok((owner, repo)),
            (None, _) => Err(missing("repository owner", "use --owner or -o")),
            (_, None) => Err(missing("repository name", "use --repo or -r")),
        }
    }

    /// Returns the webhook secret.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when it is not set.
    pub fn require_webhook_secret(&self) -> Result<&str, AppError> {
        present(self.webhook_secret.as_ref())
            .ok_or_else(|| missing("webhook secret", "set REVIEW_POLICE_WEBHOOK_SECRET"))
    }

    /// Builds the Discord connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when the token or channel is
    /// missing.
    pub fn require_discord(&self) -> Result<DiscordConfig, AppError> {
        let token = present(self.discord_token.as_ref())
            .ok_or_else(|| missing("Discord bot token", "set REVIEW_POLICE_DISCORD_TOKEN"))?;
        let channel = present(self.discord_channel_id.as_ref()).ok_or_else(|| {
            missing("Discord channel id", "set REVIEW_POLICE_DISCORD_CHANNEL_ID")
        })?;

        let config = DiscordConfig::new(token, channel);
        Ok(match present(self.discord_api_base.as_ref()) {
            Some(base_url) => config.with_base_url(base_url),
            None => config,
        })
    }

    /// Returns the relay channel URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when it is not set.
    pub fn require_relay_url(&self) -> Result<&str, AppError> {
        present(self.relay_url.as_ref())
            .ok_or_else(|| missing("relay URL", "set REVIEW_POLICE_RELAY_URL"))
    }

    /// Returns the Discord user the command-line modes act for.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when it is not set.
    pub fn require_user(&self) -> Result<&str, AppError> {
        present(self.user.as_ref()).ok_or_else(|| missing("Discord user id", "use --user or -u"))
    }

    /// Parses the requested review view, defaulting to all requests.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] for an unknown view.
    pub fn review_view(&self) -> Result<ReviewRequestView, AppError> {
        self.view
            .as_deref()
            .unwrap_or_default()
            .parse::<ReviewRequestView>()
            .map_err(|error| AppError::Configuration {
                message: error.to_string(),
            })
    }

    /// Splits the configured pull request selection on commas.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when nothing was selected.
    pub fn require_pull_selections(&self) -> Result<Vec<String>, AppError> {
        let selections: Vec<String> = self
            .pulls
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .collect();
        if selections.is_empty() {
            return Err(missing("pull request selection", "use --pulls or -P"));
        }
        Ok(selections)
    }

    /// Location of the identity mapping document.
    #[must_use]
    pub fn mappings_path(&self) -> &Utf8Path {
        Utf8Path::new(&self.mappings_path)
    }

    /// Timing settings for the notification correlator.
    #[must_use]
    pub const fn correlator_settings(&self) -> CorrelatorSettings {
        CorrelatorSettings {
            grace_window: Duration::from_millis(self.grace_window_ms),
            pending_ttl: Duration::from_secs(self.pending_ttl_secs),
        }
    }
}

#[cfg(test)]
mod tests;
