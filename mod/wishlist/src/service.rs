use std::sync::Arc;

use thiserror::Error;

use bookstore_core::now_rfc3339;
use bookstore_sql::{SQLStore, Value};

/// Wishlist service error type.
#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("storage: {0}")]
    Storage(String),
}

impl From<WishlistError> for bookstore_core::ServiceError {
    fn from(e: WishlistError) -> Self {
        match e {
            WishlistError::Storage(m) => bookstore_core::ServiceError::Storage(m),
        }
    }
}

/// The wishlist service. Membership mutations are single statements, so
/// per-(user, book) atomicity comes from the store.
pub struct WishlistService {
    sql: Arc<dyn SQLStore>,
}

impl WishlistService {
    /// Create a new WishlistService, initializing the schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Arc<Self>, WishlistError> {
        sql.exec(
            "CREATE TABLE IF NOT EXISTS wishlist (
                user_id TEXT NOT NULL,
                book_id TEXT NOT NULL,
                added_at TEXT NOT NULL,
                PRIMARY KEY (user_id, book_id),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            &[],
        )
        .map_err(|e| WishlistError::Storage(e.to_string()))?;

        Ok(Arc::new(Self { sql }))
    }

    /// Add a book to a user's wishlist. Returns whether a row was
    /// actually inserted; re-adding a present member is a no-op.
    pub fn add(&self, user_id: &str, book_id: &str) -> Result<bool, WishlistError> {
        let affected = self
            .sql
            .exec(
                "INSERT OR IGNORE INTO wishlist (user_id, book_id, added_at) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(book_id.to_string()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(|e| WishlistError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }

    /// Remove a book from a user's wishlist. Removing an absent member
    /// is a no-op.
    pub fn remove(&self, user_id: &str, book_id: &str) -> Result<bool, WishlistError> {
        let affected = self
            .sql
            .exec(
                "DELETE FROM wishlist WHERE user_id = ?1 AND book_id = ?2",
                &[
                    Value::Text(user_id.to_string()),
                    Value::Text(book_id.to_string()),
                ],
            )
            .map_err(|e| WishlistError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }

    /// List a user's wishlist book ids, most recently added first.
    pub fn list(&self, user_id: &str) -> Result<Vec<String>, WishlistError> {
        let rows = self
            .sql
            .query(
                "SELECT book_id FROM wishlist WHERE user_id = ?1 ORDER BY added_at DESC",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| WishlistError::Storage(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|r| r.get_str("book_id").map(|s| s.to_string()))
            .collect())
    }
}
