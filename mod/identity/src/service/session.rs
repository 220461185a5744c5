//! Password sessions — login, signup, refresh rotation, logout.

use argon2::Argon2;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand_core::OsRng;

use bookstore_core::{new_id, Claims};
use bookstore_sql::Value;

use crate::model::{IssuedSession, Session, User};
use crate::service::{IdentityError, IdentityService};

impl IdentityService {
    /// Authenticate a password account and issue a session.
    ///
    /// Unknown email, a provider-synced record with no password, and a
    /// wrong password are indistinguishable to the caller.
    pub fn login(&self, email: &str, password: &str) -> Result<IssuedSession, IdentityError> {
        let user = self
            .find_user_by_email(email)?
            .ok_or(IdentityError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(IdentityError::InvalidCredentials)?;

        if !verify_password(password, hash) {
            return Err(IdentityError::InvalidCredentials);
        }

        self.issue_session(&user)
    }

    /// Create a local password account and issue a session.
    pub fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, IdentityError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(IdentityError::Validation("invalid email address".into()));
        }
        if password.len() < 8 {
            return Err(IdentityError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        if self.find_user_by_email(email)?.is_some() {
            return Err(IdentityError::EmailTaken);
        }

        let hash = hash_password(password)?;
        // insert_local_user maps a lost race on the unique index to
        // EmailTaken as well.
        let user = self.insert_local_user(name.trim(), email, &hash)?;
        self.issue_session(&user)
    }

    /// Rotate a session: validate the opaque refresh token, revoke the
    /// old session row, and issue a fresh pair. A used refresh token is
    /// invalid afterwards.
    pub fn refresh(&self, refresh_token: &str) -> Result<IssuedSession, IdentityError> {
        let session = self
            .find_session_by_refresh(refresh_token)?
            .ok_or(IdentityError::RefreshInvalid)?;

        if session.revoked || is_expired(&session.expires_at) {
            return Err(IdentityError::RefreshInvalid);
        }

        let user = self
            .get_user(&session.user_id)
            .map_err(|_| IdentityError::RefreshInvalid)?;

        self.revoke_session(&session.id)?;
        self.issue_session(&user)
    }

    /// Revoke the session behind a refresh token. Missing or already
    /// revoked sessions are fine — logout is a client-state operation
    /// first, and the endpoint never fails the caller over it.
    pub fn logout(&self, refresh_token: &str) -> Result<(), IdentityError> {
        if let Some(session) = self.find_session_by_refresh(refresh_token)? {
            self.revoke_session(&session.id)?;
        }
        Ok(())
    }

    /// Issue an access token + refresh token pair for a user, recording
    /// the session.
    pub fn issue_session(&self, user: &User) -> Result<IssuedSession, IdentityError> {
        let session_id = new_id();
        let now = chrono::Utc::now();
        let access_exp = now + chrono::Duration::seconds(self.config.access_token_ttl);
        let refresh_exp = now + chrono::Duration::seconds(self.config.refresh_token_ttl);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            admin: self.config.admin_email.as_deref() == Some(user.email.as_str()),
            sid: session_id.clone(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| IdentityError::Internal(format!("JWT encode failed: {}", e)))?;

        let refresh_token = new_id();

        self.sql
            .exec(
                "INSERT INTO sessions (id, user_id, refresh_token, revoked, issued_at, expires_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5)",
                &[
                    Value::Text(session_id),
                    Value::Text(user.id.clone()),
                    Value::Text(refresh_token.clone()),
                    Value::Text(now.to_rfc3339()),
                    Value::Text(refresh_exp.to_rfc3339()),
                ],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;

        Ok(IssuedSession {
            access_token,
            refresh_token,
            user: user.public(),
        })
    }

    /// Verify and decode an access token.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, IdentityError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "access token rejected");
            IdentityError::InvalidCredentials
        })?;
        Ok(token_data.claims)
    }

    fn find_session_by_refresh(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, IdentityError> {
        let rows = self
            .sql
            .query(
                "SELECT id, user_id, refresh_token, revoked, issued_at, expires_at
                 FROM sessions WHERE refresh_token = ?1",
                &[Value::Text(refresh_token.to_string())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };

        Ok(Some(Session {
            id: row.get_str("id").unwrap_or_default().to_string(),
            user_id: row.get_str("user_id").unwrap_or_default().to_string(),
            refresh_token: row.get_str("refresh_token").unwrap_or_default().to_string(),
            revoked: row.get_i64("revoked").unwrap_or(0) != 0,
            issued_at: row.get_str("issued_at").unwrap_or_default().to_string(),
            expires_at: row.get_str("expires_at").unwrap_or_default().to_string(),
        }))
    }

    fn revoke_session(&self, session_id: &str) -> Result<(), IdentityError> {
        self.sql
            .exec(
                "UPDATE sessions SET revoked = 1 WHERE id = ?1",
                &[Value::Text(session_id.to_string())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(())
    }
}

/// Hash a password with argon2id and a fresh random salt.
fn hash_password(password: &str) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| IdentityError::Internal(format!("password hash failed: {}", e)))
}

/// Verify a password attempt against a stored argon2id hash.
fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn is_expired(expires_at: &str) -> bool {
    match chrono::DateTime::parse_from_rfc3339(expires_at) {
        Ok(exp) => exp < chrono::Utc::now(),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserEvent;
    use crate::service::test_support::{test_service, test_service_with};
    use crate::service::IdentityConfig;

    #[test]
    fn signup_then_login() {
        let svc = test_service();

        let issued = svc.signup("Alice", "alice@example.com", "hunter2hunter2").unwrap();
        assert!(!issued.access_token.is_empty());
        assert_eq!(issued.user.email, "alice@example.com");

        // Wrong password issues nothing.
        assert!(matches!(
            svc.login("alice@example.com", "wrong-password"),
            Err(IdentityError::InvalidCredentials)
        ));

        // Right password issues a fresh token.
        let issued2 = svc.login("alice@example.com", "hunter2hunter2").unwrap();
        let claims = svc.verify_access_token(&issued2.access_token).unwrap();
        assert_eq!(claims.sub, issued.user.id);
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn login_unknown_email() {
        let svc = test_service();
        assert!(matches!(
            svc.login("nobody@example.com", "whatever1"),
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[test]
    fn signup_duplicate_email() {
        let svc = test_service();
        svc.signup("Alice", "alice@example.com", "hunter2hunter2").unwrap();
        assert!(matches!(
            svc.signup("Alice Again", "alice@example.com", "hunter2hunter2"),
            Err(IdentityError::EmailTaken)
        ));
    }

    #[test]
    fn signup_blocked_by_provider_owned_email() {
        let svc = test_service();
        svc.apply_event(UserEvent::Created {
            id: "u1".into(),
            email: "a@x.com".into(),
            name: "A".into(),
        })
        .unwrap();

        assert!(matches!(
            svc.signup("A", "a@x.com", "hunter2hunter2"),
            Err(IdentityError::EmailTaken)
        ));
    }

    #[test]
    fn provider_record_cannot_password_login() {
        let svc = test_service();
        svc.apply_event(UserEvent::Created {
            id: "u1".into(),
            email: "a@x.com".into(),
            name: "A".into(),
        })
        .unwrap();

        assert!(matches!(
            svc.login("a@x.com", "anything-at-all"),
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[test]
    fn signup_validation() {
        let svc = test_service();
        assert!(matches!(
            svc.signup("A", "not-an-email", "hunter2hunter2"),
            Err(IdentityError::Validation(_))
        ));
        assert!(matches!(
            svc.signup("A", "a@x.com", "short"),
            Err(IdentityError::Validation(_))
        ));
    }

    #[test]
    fn refresh_rotates_and_invalidates_old_token() {
        let svc = test_service();
        let first = svc.signup("Bob", "bob@example.com", "hunter2hunter2").unwrap();

        let second = svc.refresh(&first.refresh_token).unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);
        assert_eq!(second.user.id, first.user.id);

        // The old refresh token was consumed by rotation.
        assert!(matches!(
            svc.refresh(&first.refresh_token),
            Err(IdentityError::RefreshInvalid)
        ));

        // The new one still works.
        assert!(svc.refresh(&second.refresh_token).is_ok());
    }

    #[test]
    fn refresh_unknown_token() {
        let svc = test_service();
        assert!(matches!(
            svc.refresh("no-such-token"),
            Err(IdentityError::RefreshInvalid)
        ));
    }

    #[test]
    fn refresh_expired_session() {
        let svc = test_service();
        let issued = svc.signup("Bob", "bob@example.com", "hunter2hunter2").unwrap();

        // Force the session past its expiry.
        svc.sql
            .exec(
                "UPDATE sessions SET expires_at = ?1 WHERE refresh_token = ?2",
                &[
                    Value::Text("2000-01-01T00:00:00+00:00".into()),
                    Value::Text(issued.refresh_token.clone()),
                ],
            )
            .unwrap();

        assert!(matches!(
            svc.refresh(&issued.refresh_token),
            Err(IdentityError::RefreshInvalid)
        ));
    }

    #[test]
    fn logout_revokes_and_tolerates_unknown() {
        let svc = test_service();
        let issued = svc.signup("Bob", "bob@example.com", "hunter2hunter2").unwrap();

        svc.logout(&issued.refresh_token).unwrap();
        assert!(matches!(
            svc.refresh(&issued.refresh_token),
            Err(IdentityError::RefreshInvalid)
        ));

        // Unknown token is a no-op.
        svc.logout("no-such-token").unwrap();
    }

    #[test]
    fn deleting_user_cascades_sessions() {
        let svc = test_service();
        svc.apply_event(UserEvent::Created {
            id: "u1".into(),
            email: "a@x.com".into(),
            name: "A".into(),
        })
        .unwrap();
        let user = svc.get_user("u1").unwrap();
        let issued = svc.issue_session(&user).unwrap();

        svc.apply_event(UserEvent::Deleted { id: "u1".into() }).unwrap();
        assert!(matches!(
            svc.refresh(&issued.refresh_token),
            Err(IdentityError::RefreshInvalid)
        ));
    }

    #[test]
    fn admin_claim_follows_config() {
        let svc = test_service_with(IdentityConfig {
            admin_email: Some("root@example.com".into()),
            ..Default::default()
        });

        let admin = svc.signup("Root", "root@example.com", "hunter2hunter2").unwrap();
        let claims = svc.verify_access_token(&admin.access_token).unwrap();
        assert!(claims.admin);

        let plain = svc.signup("Bob", "bob@example.com", "hunter2hunter2").unwrap();
        let claims = svc.verify_access_token(&plain.access_token).unwrap();
        assert!(!claims.admin);
    }
}
