//! Webhook signature verification.
//!
//! The provider signs each delivery with HMAC-SHA256 over
//! `{id}.{timestamp}.{body}` and sends the result in the
//! `svix-signature` header as one or more space-separated `v1,<base64>`
//! entries (multiple entries appear during secret rotation).
//!
//! Verification operates on the raw request body bytes exactly as
//! received. Re-serializing the JSON first can change byte-for-byte
//! content (whitespace, key order) and make a genuine signature appear
//! invalid — the handler must hand this module the untouched `Bytes`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::service::IdentityError;

type HmacSha256 = Hmac<Sha256>;

/// Header bundle accompanying a webhook delivery.
#[derive(Debug, Clone, Copy)]
pub struct WebhookHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

/// Validates webhook deliveries against the shared secret.
///
/// Pure predicate over its inputs plus the secret; failure is never
/// retried here — the sender redelivers on its own schedule.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    /// Create a verifier from the provider-issued secret.
    ///
    /// Secrets in the provider's `whsec_<base64>` form are decoded;
    /// anything else is used as raw key bytes.
    pub fn new(secret: &str, tolerance_secs: i64) -> Self {
        let secret = match secret.strip_prefix("whsec_") {
            Some(encoded) => BASE64
                .decode(encoded)
                .unwrap_or_else(|_| encoded.as_bytes().to_vec()),
            None => secret.as_bytes().to_vec(),
        };
        Self {
            secret,
            tolerance_secs,
        }
    }

    /// Verify a delivery. Returns Ok(()) only when the timestamp is
    /// within tolerance and at least one signature entry matches the
    /// MAC of the raw body.
    pub fn verify(&self, body: &[u8], headers: &WebhookHeaders) -> Result<(), IdentityError> {
        let timestamp: i64 = headers
            .timestamp
            .parse()
            .map_err(|_| IdentityError::SignatureInvalid("bad timestamp header".into()))?;

        let now = chrono::Utc::now().timestamp();
        if (now - timestamp).abs() > self.tolerance_secs {
            return Err(IdentityError::SignatureInvalid(
                "timestamp outside tolerance".into(),
            ));
        }

        let signed = self.signed_content(headers.id, headers.timestamp, body);

        for entry in headers.signature.split(' ') {
            let Some(encoded) = entry.strip_prefix("v1,") else {
                continue;
            };
            let Ok(candidate) = BASE64.decode(encoded) else {
                continue;
            };
            let mut mac = HmacSha256::new_from_slice(&self.secret)
                .expect("HMAC can take key of any size");
            mac.update(&signed);
            // verify_slice is constant-time.
            if mac.verify_slice(&candidate).is_ok() {
                return Ok(());
            }
        }

        Err(IdentityError::SignatureInvalid(
            "no matching signature".into(),
        ))
    }

    /// Compute the base64 signature for a delivery. Used by tests and
    /// by anything that needs to emit deliveries this verifier accepts.
    pub fn sign(&self, id: &str, timestamp: &str, body: &[u8]) -> String {
        let signed = self.signed_content(id, timestamp, body);
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(&signed);
        BASE64.encode(mac.finalize().into_bytes())
    }

    fn signed_content(&self, id: &str, timestamp: &str, body: &[u8]) -> Vec<u8> {
        let mut signed = Vec::with_capacity(id.len() + timestamp.len() + body.len() + 2);
        signed.extend_from_slice(id.as_bytes());
        signed.push(b'.');
        signed.extend_from_slice(timestamp.as_bytes());
        signed.push(b'.');
        signed.extend_from_slice(body);
        signed
    }
}
