//! `X-Hub-Signature-256` verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::WebhookError;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// Checks `signature` against the HMAC-SHA256 of `payload` under `secret`.
///
/// The comparison runs in constant time.
///
/// # Errors
///
/// Returns [`WebhookError::MalformedSignature`] when the header is not
/// `sha256=<hex>`, and [`WebhookError::SignatureMismatch`] when the digest
/// differs.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> Result<(), WebhookError> {
    let signature_hex =
        signature
            .trim()
            .strip_prefix(SIGNATURE_PREFIX)
            .ok_or_else(|| WebhookError::MalformedSignature {
                message: format!("expected `{SIGNATURE_PREFIX}` prefix"),
            })?;

    let expected = hex::decode(signature_hex).map_err(|error| WebhookError::MalformedSignature {
        message: error.to_string(),
    })?;

    let mut mac = mac_for(secret)?;
    mac.update(payload);
    mac.verify_slice(&expected)
        .map_err(|_| WebhookError::SignatureMismatch)
}

/// Produces the `sha256=<hex>` header value GitHub would send for `payload`.
///
/// # Errors
///
/// Returns [`WebhookError::MalformedSignature`] if the key is rejected by the
/// MAC, which HMAC never does in practice.
pub fn sign(secret: &str, payload: &[u8]) -> Result<String, WebhookError> {
    let mut mac = mac_for(secret)?;
    mac.update(payload);
    Ok(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

fn mac_for(secret: &str) -> Result<HmacSha256, WebhookError> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|error| {
        WebhookError::MalformedSignature {
            message: format!("invalid secret: {error}"),
        }
    })
}
