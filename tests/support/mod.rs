//! Shared fixtures for integration tests.
//!
//! The fake Discord API is a `wiremock` server answering user lookups and
//! recording posted messages, so tests can inspect exactly what reached the
//! channel.

use std::sync::Arc;

use review_police::chat::{ChatSink, DiscordChatSink, DiscordConfig, MentionResolver};
use review_police::identity::{IdentityMapper, IdentityMapping};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Channel every test posts to.
pub const CHANNEL_ID: &str = "4242";

/// Discord user id and GitHub login pairs known to every test.
pub const PEOPLE: [(&str, &str); 4] = [
    ("111", "alice"),
    ("222", "bob"),
    ("333", "carol"),
    ("444", "dave"),
];

/// Starts a fake Discord API that resolves every known user and accepts
/// channel messages.
pub async fn discord_server() -> MockServer {
    let server = MockServer::start().await;
    for (discord_id, _) in PEOPLE {
        Mock::given(method("GET"))
            .and(path(format!("/users/{discord_id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": discord_id })))
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path(format!("/channels/{CHANNEL_ID}/messages")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "m-1" })))
        .mount(&server)
        .await;
    server
}

/// Chat sink talking to the fake Discord API.
pub fn chat_sink(server: &MockServer) -> Arc<dyn ChatSink> {
    let config = DiscordConfig::new("bot-token", CHANNEL_ID).with_base_url(server.uri());
    Arc::new(DiscordChatSink::new(config).expect("Discord sink should build"))
}

/// Identity table built from [`PEOPLE`].
pub fn identities() -> Arc<IdentityMapper> {
    Arc::new(IdentityMapper::new(
        PEOPLE
            .iter()
            .map(|(discord_id, github_login)| IdentityMapping {
                discord_id: (*discord_id).to_owned(),
                github_login: (*github_login).to_owned(),
            })
            .collect(),
    ))
}

/// Resolver over [`identities`] and the given sink.
pub fn mentions(sink: &Arc<dyn ChatSink>) -> MentionResolver {
    MentionResolver::new(identities(), Arc::clone(sink))
}

/// Embeds of every message posted to the channel, in arrival order.
pub async fn posted_embeds(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| {
            request.method.as_str() == "POST"
                && request.url.path() == format!("/channels/{CHANNEL_ID}/messages")
        })
        .filter_map(|request| {
            let body: Value = request.body_json().ok()?;
            body.get("embeds")?.get(0).cloned()
        })
        .collect()
}

/// Text field of an embed, or an empty string.
pub fn embed_text<'embed>(embed: &'embed Value, field: &str) -> &'embed str {
    embed.get(field).and_then(Value::as_str).unwrap_or_default()
}
