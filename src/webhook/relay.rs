//! Development transport: consumes a smee.io style event stream.
//!
//! Each `data:` line of the stream is a JSON object carrying the original
//! delivery headers (lower-cased) and the delivery `body`. The body is kept
//! as raw JSON text so the signature is checked against the bytes the proxy
//! relayed.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::value::RawValue;

use super::{Dispatcher, WebhookEnvelope, WebhookError};

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// One event parsed from a server-sent-event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamEvent {
    /// `event:` field, if any.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

/// Incremental server-sent-event parser.
///
/// Bytes may arrive split at arbitrary points; complete events are returned
/// once their terminating blank line has been seen.
#[derive(Debug, Default)]
pub struct StreamParser {
    buffer: Vec<u8>,
    current: StreamEvent,
    has_data: bool,
}

impl StreamParser {
    /// Feeds a chunk and returns every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);
        let mut completed = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.accept_line(trimmed) {
                completed.push(event);
            }
        }
        completed
    }

    fn accept_line(&mut self, line: &str) -> Option<StreamEvent> {
        if line.is_empty() {
            let finished = std::mem::take(&mut self.current);
            let had_data = std::mem::replace(&mut self.has_data, false);
            return had_data.then_some(finished);
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, raw_value) = line.split_once(':').unwrap_or((line, ""));
        let value = raw_value.strip_prefix(' ').unwrap_or(raw_value);
        match field {
            "event" => self.current.event = Some(value.to_owned()),
            "data" => {
                if self.has_data {
                    self.current.data.push('\n');
                }
                self.current.data.push_str(value);
                self.has_data = true;
            }
            _ => {}
        }
        None
    }
}

#[derive(Debug, Deserialize)]
struct RelayedDelivery {
    #[serde(rename = "x-github-delivery", default)]
    delivery: Option<String>,
    #[serde(rename = "x-request-id", default)]
    request_id: Option<String>,
    #[serde(rename = "x-github-event", default)]
    event: Option<String>,
    #[serde(rename = "x-hub-signature-256", default)]
    signature: Option<String>,
    #[serde(default)]
    body: Option<Box<RawValue>>,
}

/// Converts one relayed message into an envelope.
///
/// Returns `Ok(None)` for proxy housekeeping messages that carry no event
/// name, such as the initial `ready` event.
///
/// # Errors
///
/// Returns [`WebhookError::Payload`] when the message is not JSON.
pub fn envelope_from_relay(data: &str) -> Result<Option<WebhookEnvelope>, WebhookError> {
    let relayed: RelayedDelivery = serde_json::from_str(data)?;
    let Some(name) = relayed.event else {
        return Ok(None);
    };

    Ok(Some(WebhookEnvelope {
        id: relayed
            .delivery
            .or(relayed.request_id)
            .unwrap_or_default(),
        name,
        signature: relayed.signature.unwrap_or_default(),
        payload: relayed
            .body
            .map(|body| body.get().as_bytes().to_vec())
            .unwrap_or_default(),
    }))
}

/// Long-running consumer of a relay channel.
#[derive(Debug, Clone)]
pub struct RelayClient {
    url: String,
    client: Client,
}

impl RelayClient {
    /// Creates a client for the channel at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn new(url: impl Into<String>) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .build()
            .map_err(|error| WebhookError::Transport {
                message: format!("failed to configure relay HTTP client: {error}"),
            })?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Consumes the channel forever, reconnecting after each failure.
    pub async fn run(&self, dispatcher: &Dispatcher) {
        loop {
            match self.consume(dispatcher).await {
                Ok(()) => tracing::info!(url = %self.url, "relay stream closed"),
                Err(error) => tracing::warn!(url = %self.url, %error, "relay stream failed"),
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    /// Consumes one connection until the stream ends.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Transport`] when connecting or reading fails.
    pub async fn consume(&self, dispatcher: &Dispatcher) -> Result<(), WebhookError> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|error| WebhookError::Transport {
                message: format!("failed to connect to relay: {error}"),
            })?;
        tracing::info!(url = %self.url, "connected to webhook relay");

        let mut parser = StreamParser::default();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let bytes = chunk.map_err(|error| WebhookError::Transport {
                message: format!("relay stream interrupted: {error}"),
            })?;
            for event in parser.push(&bytes) {
                relay_event(dispatcher, &event).await;
            }
        }
        Ok(())
    }
}

async fn relay_event(dispatcher: &Dispatcher, event: &StreamEvent) {
    match envelope_from_relay(&event.data) {
        Ok(Some(envelope)) => {
            let outcome = dispatcher.dispatch(&envelope).await;
            tracing::debug!(delivery = %envelope.id, ?outcome, "relayed delivery dispatched");
        }
        Ok(None) => tracing::debug!(event = ?event.event, "skipping relay housekeeping message"),
        Err(error) => tracing::warn!(%error, "skipping undecodable relay message"),
    }
}
