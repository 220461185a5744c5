//! Event normalization — provider payloads to the internal tagged union.

use crate::model::UserEvent;
use crate::service::IdentityError;

/// Normalize a verified raw payload into a [`UserEvent`].
///
/// Unknown event kinds come back as `Unrecognized` — the caller
/// acknowledges them so the sender doesn't redeliver an event we
/// intentionally ignore. A Created/Updated event with no usable email is
/// `MalformedEvent`: upserting a blank email would collide on the unique
/// index across every such user.
pub fn normalize(payload: &[u8]) -> Result<UserEvent, IdentityError> {
    let value: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| IdentityError::MalformedEvent(format!("invalid JSON: {}", e)))?;

    let kind = value["type"]
        .as_str()
        .ok_or_else(|| IdentityError::MalformedEvent("missing 'type' field".into()))?;

    let data = &value["data"];

    match kind {
        "user.created" | "user.updated" => {
            let id = required_id(data)?;
            let email = extract_email(data).ok_or_else(|| {
                IdentityError::MalformedEvent(format!("{} event without email", kind))
            })?;
            let name = display_name(data);
            if kind == "user.created" {
                Ok(UserEvent::Created { id, email, name })
            } else {
                Ok(UserEvent::Updated { id, email, name })
            }
        }
        "user.deleted" => {
            let id = required_id(data)?;
            Ok(UserEvent::Deleted { id })
        }
        other => Ok(UserEvent::Unrecognized {
            kind: other.to_string(),
        }),
    }
}

fn required_id(data: &serde_json::Value) -> Result<String, IdentityError> {
    data["id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| IdentityError::MalformedEvent("missing 'data.id'".into()))
}

/// Email lives either directly in `data.email` or in the provider's
/// `data.email_addresses[0].email_address` shape.
fn extract_email(data: &serde_json::Value) -> Option<String> {
    data["email"]
        .as_str()
        .filter(|s| !s.is_empty())
        .or_else(|| {
            data["email_addresses"][0]["email_address"]
                .as_str()
                .filter(|s| !s.is_empty())
        })
        .map(|s| s.to_string())
}

/// Join trimmed first/last name, falling back to a placeholder when
/// both are absent.
fn display_name(data: &serde_json::Value) -> String {
    let first = data["first_name"].as_str().unwrap_or("").trim();
    let last = data["last_name"].as_str().unwrap_or("").trim();
    let joined = format!("{} {}", first, last).trim().to_string();
    if joined.is_empty() {
        "Unknown".to_string()
    } else {
        joined
    }
}
