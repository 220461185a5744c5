pub mod event;
pub mod reconcile;
pub mod schema;
pub mod session;
pub mod signature;
pub mod user;

use std::sync::Arc;

use thiserror::Error;

use bookstore_sql::{Row, SQLStore};

use crate::service::signature::WebhookVerifier;

/// Identity service error type.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Webhook payload failed signature verification. Fatal to the
    /// delivery; never retried here.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// Webhook payload parsed but is missing required fields.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already in use")]
    EmailTaken,

    #[error("refresh token invalid or expired")]
    RefreshInvalid,

    #[error("validation: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<IdentityError> for bookstore_core::ServiceError {
    fn from(e: IdentityError) -> Self {
        use bookstore_core::ServiceError;
        match e {
            IdentityError::SignatureInvalid(m) => ServiceError::Unauthorized(m),
            IdentityError::MalformedEvent(m) => ServiceError::Validation(m),
            IdentityError::InvalidCredentials => {
                ServiceError::Unauthorized("invalid credentials".into())
            }
            IdentityError::EmailTaken => ServiceError::Conflict("email already in use".into()),
            IdentityError::RefreshInvalid => {
                ServiceError::Unauthorized("refresh token invalid or expired".into())
            }
            IdentityError::Validation(m) => ServiceError::Validation(m),
            IdentityError::NotFound(m) => ServiceError::NotFound(m),
            IdentityError::Conflict(m) => ServiceError::Conflict(m),
            IdentityError::Storage(m) => ServiceError::Storage(m),
            IdentityError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// Configuration for the identity service.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// JWT signing secret for access tokens.
    pub jwt_secret: String,
    /// Webhook signing secret, as issued by the provider
    /// (`whsec_<base64>` or raw).
    pub webhook_secret: String,
    /// Access token lifetime in seconds (default: 15 min).
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds (default: 7 days).
    pub refresh_token_ttl: i64,
    /// Accepted clock skew for webhook timestamps, in seconds.
    pub webhook_tolerance_secs: i64,
    /// Email of the admin account, if any. Matching users get an
    /// `admin` claim in their tokens.
    pub admin_email: Option<String>,
    /// Mark the refresh cookie Secure. Leave on outside local
    /// development — browsers and cookie stores drop Secure cookies on
    /// plain HTTP.
    pub secure_cookies: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "bookstore-dev-secret-change-me".to_string(),
            webhook_secret: "whsec_dGVzdC1zZWNyZXQ=".to_string(),
            access_token_ttl: 900,         // 15 min
            refresh_token_ttl: 604800,     // 7 days
            webhook_tolerance_secs: 300,   // 5 min
            admin_email: None,
            secure_cookies: true,
        }
    }
}

/// The identity service. Holds the store, configuration, and the
/// webhook verifier.
pub struct IdentityService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) config: IdentityConfig,
    pub(crate) verifier: WebhookVerifier,
}

impl IdentityService {
    /// Create a new IdentityService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        config: IdentityConfig,
    ) -> Result<Arc<Self>, IdentityError> {
        schema::init_schema(sql.as_ref())?;
        let verifier =
            WebhookVerifier::new(&config.webhook_secret, config.webhook_tolerance_secs);
        Ok(Arc::new(Self {
            sql,
            config,
            verifier,
        }))
    }

    /// The webhook verifier for this service's configured secret.
    pub fn verifier(&self) -> &WebhookVerifier {
        &self.verifier
    }

    /// Refresh token lifetime in seconds, for cookie max-age.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.config.refresh_token_ttl
    }

    /// Whether refresh cookies carry the Secure attribute.
    pub fn secure_cookies(&self) -> bool {
        self.config.secure_cookies
    }

    pub(crate) fn user_from_row(row: &Row) -> Result<crate::model::User, IdentityError> {
        Ok(crate::model::User {
            id: row
                .get_str("id")
                .ok_or_else(|| IdentityError::Internal("missing id column".into()))?
                .to_string(),
            email: row
                .get_str("email")
                .ok_or_else(|| IdentityError::Internal("missing email column".into()))?
                .to_string(),
            name: row.get_str("name").unwrap_or_default().to_string(),
            password_hash: row.get_str("password_hash").map(|s| s.to_string()),
            created_at: row.get_str("created_at").unwrap_or_default().to_string(),
        })
    }
}
