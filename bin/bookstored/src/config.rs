//! Server configuration, loaded from a TOML file.
//!
//! The config argument resolves to `/etc/bookstore/<name>.toml`; a value
//! containing `/` or `.` is used as a path directly.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub recommender: RecommenderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "/var/lib/bookstore".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Access token signing secret.
    pub secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: i64,
    /// Whether the refresh cookie is marked Secure. Disable only for
    /// plain-HTTP local development.
    #[serde(default = "default_true")]
    pub secure_cookies: bool,
}

fn default_access_ttl() -> i64 {
    900 // 15 min
}

fn default_refresh_ttl() -> i64 {
    604800 // 7 days
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Provider-issued webhook signing secret (`whsec_...`).
    pub secret: String,
    /// Accepted clock skew for delivery timestamps, in seconds.
    #[serde(default = "default_tolerance")]
    pub tolerance_secs: i64,
}

fn default_tolerance() -> i64 {
    300 // 5 min
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Email of the admin account. Tokens issued to it carry the admin
    /// claim.
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommenderConfig {
    /// Base URL of the recommendation service; absent disables the proxy.
    #[serde(default)]
    pub url: Option<String>,
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/bookstore/{}.toml", name_or_path))
        }
    }

    /// Load and parse a config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Verify the configuration is ready for use.
    pub fn verify(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("jwt.secret is empty in configuration");
        }
        if self.webhook.secret.is_empty() {
            anyhow::bail!("webhook.secret is empty in configuration");
        }
        if self.storage.data_dir.is_empty() {
            anyhow::bail!("storage.data_dir is empty in configuration");
        }
        Ok(())
    }

    /// Path of the SQLite database file.
    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("data.sqlite")
    }
}
