use serde::{Deserialize, Serialize};

/// A user identity.
///
/// Provider-synced records use the provider's stable id and carry no
/// password hash; locally created accounts get a generated id and an
/// argon2id hash. Exactly one record exists per id; email is unique
/// across all records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier — the provider's external identity, or a
    /// locally issued id for password signups.
    pub id: String,

    /// Email address. Unique at the store.
    pub email: String,

    /// Display name. May be empty.
    #[serde(default)]
    pub name: String,

    /// argon2id hash for password accounts; absent for provider records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl User {
    /// The API-facing projection, without credential material.
    pub fn public(&self) -> UserPublic {
        UserPublic {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// Public view of a user, safe to serialize into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: String,
}
