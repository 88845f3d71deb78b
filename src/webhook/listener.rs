//! Direct HTTP endpoint GitHub posts deliveries to.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use tokio::net::TcpListener;

use super::{Dispatcher, WebhookEnvelope, WebhookError};

const DELIVERY_HEADER: &str = "x-github-delivery";
const EVENT_HEADER: &str = "x-github-event";
const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Router accepting deliveries on `POST /`.
#[must_use]
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", post(receive))
        .with_state(dispatcher)
}

/// Binds `addr` and serves deliveries until the process stops.
///
/// # Errors
///
/// Returns [`WebhookError::Transport`] when binding or serving fails.
pub async fn serve(addr: &str, dispatcher: Arc<Dispatcher>) -> Result<(), WebhookError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|error| WebhookError::Transport {
            message: format!("failed to bind {addr}: {error}"),
        })?;
    tracing::info!(addr, "listening for GitHub webhook deliveries");

    axum::serve(listener, router(dispatcher))
        .await
        .map_err(|error| WebhookError::Transport {
            message: format!("webhook listener stopped: {error}"),
        })
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

async fn receive(
    State(dispatcher): State<Arc<Dispatcher>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(name) = header_text(&headers, EVENT_HEADER) else {
        tracing::warn!("rejecting delivery without an event name");
        return StatusCode::BAD_REQUEST;
    };

    let envelope = WebhookEnvelope {
        id: header_text(&headers, DELIVERY_HEADER).unwrap_or_default(),
        name,
        signature: header_text(&headers, SIGNATURE_HEADER).unwrap_or_default(),
        payload: body.to_vec(),
    };
    let outcome = dispatcher.dispatch(&envelope).await;
    tracing::debug!(delivery = %envelope.id, ?outcome, "delivery dispatched");
    StatusCode::ACCEPTED
}
