//! POST /webhooks — identity provider event intake.
//!
//! The handler reads the body as raw bytes and verifies the signature
//! over exactly those bytes before anything is parsed. Status codes
//! follow the sender's retry contract: 200 acknowledges (including
//! intentionally ignored kinds and idempotent no-ops), 400 rejects
//! deliveries that won't improve on retry without a sender-side fix
//! (bad signature, malformed payload), 500 asks the sender to retry
//! (store failure).

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use crate::api::AppState;
use crate::service::signature::WebhookHeaders;
use crate::service::{event, IdentityError};

pub fn routes() -> Router<AppState> {
    Router::new().route("/webhooks", post(receive))
}

async fn receive(State(svc): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(bundle) = header_bundle(&headers) else {
        tracing::warn!("webhook delivery missing provider headers");
        return reject(StatusCode::BAD_REQUEST);
    };

    // Verification must short-circuit before any store access.
    if let Err(e) = svc.verifier().verify(&body, &bundle) {
        tracing::warn!(error = %e, delivery = %bundle.id, "webhook signature rejected");
        return reject(StatusCode::BAD_REQUEST);
    }

    let event = match event::normalize(&body) {
        Ok(ev) => ev,
        Err(e) => {
            tracing::warn!(error = %e, delivery = %bundle.id, "webhook payload malformed");
            return reject(StatusCode::BAD_REQUEST);
        }
    };

    match svc.apply_event(event) {
        Ok(applied) => {
            tracing::info!(delivery = %bundle.id, ?applied, "webhook processed");
            (StatusCode::OK, Json(json!({ "success": true }))).into_response()
        }
        Err(IdentityError::MalformedEvent(e)) => {
            tracing::warn!(error = %e, delivery = %bundle.id, "webhook event rejected");
            reject(StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            // Acknowledged as failed so the sender retries; never
            // reported as success.
            tracing::error!(error = %e, delivery = %bundle.id, "webhook processing failed");
            reject(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn header_bundle(headers: &HeaderMap) -> Option<WebhookHeaders<'_>> {
    Some(WebhookHeaders {
        id: header_str(headers, "svix-id")?,
        timestamp: header_str(headers, "svix-timestamp")?,
        signature: header_str(headers, "svix-signature")?,
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn reject(status: StatusCode) -> Response {
    (status, Json(json!({ "success": false }))).into_response()
}
