//! Discord REST implementation of the chat sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use super::{ChatError, ChatSink, DisplayHandle, MessageHandle, Notification};

const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const FOOTER_TEXT: &str = "Review Police";

/// Configuration for [`DiscordChatSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordConfig {
    /// Base API URL (e.g., `https://discord.com/api/v10`).
    pub base_url: String,
    /// Bot token used for authentication.
    pub bot_token: String,
    /// Channel notifications are posted to.
    pub channel_id: String,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl DiscordConfig {
    /// Constructs configuration for the public Discord API.
    #[must_use]
    pub fn new(bot_token: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            bot_token: bot_token.into(),
            channel_id: channel_id.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Chat sink posting embeds to one Discord channel.
#[derive(Debug, Clone)]
pub struct DiscordChatSink {
    config: DiscordConfig,
    client: Client,
}

impl DiscordChatSink {
    /// Creates a sink from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] when the token or channel is blank
    /// or the HTTP client cannot be built.
    pub fn new(config: DiscordConfig) -> Result<Self, ChatError> {
        if config.bot_token.trim().is_empty() {
            return Err(ChatError::Configuration {
                message: "Discord bot token is required".to_owned(),
            });
        }
        if config.channel_id.trim().is_empty() {
            return Err(ChatError::Configuration {
                message: "Discord channel id is required".to_owned(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| ChatError::Configuration {
                message: format!("failed to configure Discord HTTP client: {error}"),
            })?;

        Ok(Self { config, client })
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.config.bot_token.trim())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ChatError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "(failed to read error response body)".to_owned());
        Err(ChatError::Api {
            status: status.as_u16(),
            message: truncate_for_message(&body, 160),
        })
    }
}

#[async_trait]
impl ChatSink for DiscordChatSink {
    async fn send_notification(
        &self,
        notification: &Notification,
    ) -> Result<MessageHandle, ChatError> {
        let endpoint = self
            .config
            .endpoint(&format!("channels/{}/messages", self.config.channel_id));
        let payload = CreateMessage {
            embeds: vec![Embed {
                title: notification.title.as_str(),
                description: notification.description.as_str(),
                url: notification.url.as_deref(),
                footer: EmbedFooter { text: FOOTER_TEXT },
            }],
        };

        let response = self
            .client
            .post(endpoint)
            .header(AUTHORIZATION, self.authorization())
            .json(&payload)
            .send()
            .await
            .map_err(|error| ChatError::Network {
                message: format!("send message failed: {error}"),
            })?;

        let created: CreatedMessage = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|error| ChatError::Decode {
                message: error.to_string(),
            })?;
        Ok(MessageHandle(created.id))
    }

    async fn resolve_mention(&self, chat_user_id: &str) -> Result<DisplayHandle, ChatError> {
        let endpoint = self.config.endpoint(&format!("users/{}", chat_user_id.trim()));
        let response = self
            .client
            .get(endpoint)
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(|error| ChatError::Network {
                message: format!("fetch user failed: {error}"),
            })?;

        let user: DiscordUser = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|error| ChatError::Decode {
                message: error.to_string(),
            })?;
        Ok(DisplayHandle(format!("<@{}>", user.id)))
    }
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    embeds: Vec<Embed<'a>>,
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    footer: EmbedFooter<'a>,
}

#[derive(Debug, Serialize)]
struct EmbedFooter<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
}

fn truncate_for_message(value: &str, max_chars: usize) -> String {
    let mut truncated: String = value.chars().take(max_chars).collect();
    if value.chars().count() > max_chars {
        truncated.push('…');
    }
    truncated
}
