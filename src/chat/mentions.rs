//! Turns GitHub logins into chat mentions.

use std::sync::Arc;

use crate::identity::IdentityMapper;

use super::ChatSink;

/// Resolves GitHub logins to chat mentions, falling back to plain text.
#[derive(Clone)]
pub struct MentionResolver {
    identities: Arc<IdentityMapper>,
    sink: Arc<dyn ChatSink>,
}

impl MentionResolver {
    /// Creates a resolver over the identity table and chat sink.
    #[must_use]
    pub fn new(identities: Arc<IdentityMapper>, sink: Arc<dyn ChatSink>) -> Self {
        Self { identities, sink }
    }

    /// Mention for a chat user id, or the raw mention markup when the chat
    /// platform cannot resolve it.
    pub async fn mention_chat_user(&self, chat_user_id: &str) -> String {
        match self.sink.resolve_mention(chat_user_id).await {
            Ok(handle) => handle.0,
            Err(error) => {
                tracing::warn!(chat_user_id, %error, "failed to resolve chat mention");
                format!("<@{}>", chat_user_id.trim())
            }
        }
    }

    /// Mention for a GitHub login; unmapped logins are rendered verbatim.
    pub async fn mention_login(&self, github_login: &str) -> String {
        let Some(chat_user_id) = self.identities.discord_id_for(github_login) else {
            tracing::debug!(github_login, "no chat identity mapped for login");
            return github_login.to_owned();
        };
        match self.sink.resolve_mention(chat_user_id).await {
            Ok(handle) => handle.0,
            Err(error) => {
                tracing::warn!(github_login, %error, "failed to resolve chat mention");
                github_login.to_owned()
            }
        }
    }

    /// Space-separated mentions for several logins, in the given order.
    pub async fn mention_logins<'login, I>(&self, github_logins: I) -> String
    where
        I: IntoIterator<Item = &'login str>,
    {
        let mut mentions: Vec<String> = Vec::new();
        for login in github_logins {
            mentions.push(self.mention_login(login).await);
        }
        mentions.join(" ")
    }

    /// The identity table behind this resolver.
    #[must_use]
    pub fn identities(&self) -> &IdentityMapper {
        &self.identities
    }
}
