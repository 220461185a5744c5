//! Best-effort proxy to the recommendation microservice.
//!
//! The recommender is an opaque HTTP collaborator that may be absent or
//! failing; callers always get a list, possibly empty, never an error.

use std::time::Duration;

/// Client for the recommendation service.
pub struct RecommendationClient {
    base_url: Option<String>,
    http: reqwest::Client,
}

impl RecommendationClient {
    /// Create a client. `base_url = None` disables the proxy entirely.
    pub fn new(base_url: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            http,
        }
    }

    /// Books similar to the given book.
    pub async fn similar_books(&self, book_id: &str) -> Vec<serde_json::Value> {
        self.fetch(&format!("/similar/{}", book_id)).await
    }

    /// Personalized recommendations for a user.
    pub async fn for_user(&self, user_id: &str) -> Vec<serde_json::Value> {
        self.fetch(&format!("/recommendations/{}", user_id)).await
    }

    async fn fetch(&self, path: &str) -> Vec<serde_json::Value> {
        let Some(base) = &self.base_url else {
            return Vec::new();
        };
        let url = format!("{}{}", base, path);

        let resp = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "recommender unreachable");
                return Vec::new();
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), url = %url, "recommender returned error");
            return Vec::new();
        }

        match resp.json::<Vec<serde_json::Value>>().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "recommender response unparsable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_recommender_yields_empty() {
        let client = RecommendationClient::new(None);
        assert!(client.similar_books("b1").await.is_empty());
        assert!(client.for_user("u1").await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_recommender_yields_empty() {
        // Nothing listens on this port; the call must degrade, not fail.
        let client = RecommendationClient::new(Some("http://127.0.0.1:1".into()));
        assert!(client.similar_books("b1").await.is_empty());
    }
}
