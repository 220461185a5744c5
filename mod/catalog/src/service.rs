use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use bookstore_core::{new_id, now_rfc3339};
use bookstore_sql::{SQLStore, Value};

use crate::model::{Book, Comment, CreateBook, CreateComment, DashboardData};

/// Catalog service error type.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<CatalogError> for bookstore_core::ServiceError {
    fn from(e: CatalogError) -> Self {
        use bookstore_core::ServiceError;
        match e {
            CatalogError::NotFound(m) => ServiceError::NotFound(m),
            CatalogError::Validation(m) => ServiceError::Validation(m),
            CatalogError::Storage(m) => ServiceError::Storage(m),
            CatalogError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// The catalog service. Records are stored as JSON in a `data` column
/// with indexed columns alongside.
pub struct CatalogService {
    sql: Arc<dyn SQLStore>,
}

impl CatalogService {
    /// Create a new CatalogService, initializing the schema.
    pub fn new(sql: Arc<dyn SQLStore>) -> Result<Arc<Self>, CatalogError> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS books (
                id TEXT PRIMARY KEY,
                published INTEGER NOT NULL DEFAULT 0,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS idx_books_published ON books(published)",
            "CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                book_id TEXT NOT NULL,
                approved INTEGER NOT NULL DEFAULT 0,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
            )",
            "CREATE INDEX IF NOT EXISTS idx_comments_book ON comments(book_id)",
        ];
        for stmt in &statements {
            sql.exec(stmt, &[])
                .map_err(|e| CatalogError::Storage(e.to_string()))?;
        }
        Ok(Arc::new(Self { sql }))
    }

    // ── Books ──

    /// Add a new book to the catalog.
    pub fn add_book(&self, input: CreateBook) -> Result<Book, CatalogError> {
        if input.title.trim().is_empty() || input.author.trim().is_empty() {
            return Err(CatalogError::Validation("title and author are required".into()));
        }

        let book = Book {
            id: new_id(),
            title: input.title,
            author: input.author,
            description: input.description,
            genre: input.genre,
            image: input.image,
            rating: input.rating.clamp(0.0, 5.0),
            published: input.published,
            created_at: now_rfc3339(),
        };

        let data = to_json(&book)?;
        self.sql
            .exec(
                "INSERT INTO books (id, published, data, created_at) VALUES (?1, ?2, ?3, ?4)",
                &[
                    Value::Text(book.id.clone()),
                    Value::Integer(book.published as i64),
                    Value::Text(data),
                    Value::Text(book.created_at.clone()),
                ],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        Ok(book)
    }

    /// Get a book by id.
    pub fn get_book(&self, id: &str) -> Result<Book, CatalogError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM books WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| CatalogError::NotFound(format!("book {}", id)))?;
        from_data_column(row)
    }

    /// List books, newest first. `published_only` hides drafts for the
    /// public storefront; the admin surface lists everything.
    pub fn list_books(&self, published_only: bool) -> Result<Vec<Book>, CatalogError> {
        let sql = if published_only {
            "SELECT data FROM books WHERE published = 1 ORDER BY created_at DESC"
        } else {
            "SELECT data FROM books ORDER BY created_at DESC"
        };
        let rows = self
            .sql
            .query(sql, &[])
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        rows.iter().map(from_data_column).collect()
    }

    /// Delete a book by id. Comments cascade.
    pub fn delete_book(&self, id: &str) -> Result<(), CatalogError> {
        let affected = self
            .sql
            .exec(
                "DELETE FROM books WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(CatalogError::NotFound(format!("book {}", id)));
        }
        Ok(())
    }

    /// Flip a book's published flag. Returns the new state.
    pub fn toggle_publish(&self, id: &str) -> Result<bool, CatalogError> {
        let mut book = self.get_book(id)?;
        book.published = !book.published;
        let data = to_json(&book)?;
        self.sql
            .exec(
                "UPDATE books SET published = ?1, data = ?2 WHERE id = ?3",
                &[
                    Value::Integer(book.published as i64),
                    Value::Text(data),
                    Value::Text(id.to_string()),
                ],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        Ok(book.published)
    }

    // ── Comments ──

    /// Create a comment. Comments await admin approval.
    pub fn add_comment(&self, input: CreateComment) -> Result<Comment, CatalogError> {
        if input.content.trim().is_empty() {
            return Err(CatalogError::Validation("comment content is required".into()));
        }
        // The FK rejects comments on unknown books, but the caller gets
        // a clearer error from an explicit lookup.
        self.get_book(&input.book_id)?;

        let comment = Comment {
            id: new_id(),
            book_id: input.book_id,
            name: input.name,
            content: input.content,
            approved: false,
            created_at: now_rfc3339(),
        };

        let data = to_json(&comment)?;
        self.sql
            .exec(
                "INSERT INTO comments (id, book_id, approved, data, created_at)
                 VALUES (?1, ?2, 0, ?3, ?4)",
                &[
                    Value::Text(comment.id.clone()),
                    Value::Text(comment.book_id.clone()),
                    Value::Text(data),
                    Value::Text(comment.created_at.clone()),
                ],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;

        Ok(comment)
    }

    /// Approved comments for a book, newest first.
    pub fn comments_for_book(&self, book_id: &str) -> Result<Vec<Comment>, CatalogError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM comments WHERE book_id = ?1 AND approved = 1
                 ORDER BY created_at DESC",
                &[Value::Text(book_id.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        rows.iter().map(from_data_column).collect()
    }

    /// All comments, for the admin surface.
    pub fn all_comments(&self) -> Result<Vec<Comment>, CatalogError> {
        let rows = self
            .sql
            .query("SELECT data FROM comments ORDER BY created_at DESC", &[])
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        rows.iter().map(from_data_column).collect()
    }

    /// Approve a comment by id.
    pub fn approve_comment(&self, id: &str) -> Result<(), CatalogError> {
        let rows = self
            .sql
            .query(
                "SELECT data FROM comments WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| CatalogError::NotFound(format!("comment {}", id)))?;
        let mut comment: Comment = from_data_column(row)?;
        comment.approved = true;
        let data = to_json(&comment)?;

        self.sql
            .exec(
                "UPDATE comments SET approved = 1, data = ?1 WHERE id = ?2",
                &[Value::Text(data), Value::Text(id.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Delete a comment by id.
    pub fn delete_comment(&self, id: &str) -> Result<(), CatalogError> {
        let affected = self
            .sql
            .exec(
                "DELETE FROM comments WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(CatalogError::NotFound(format!("comment {}", id)));
        }
        Ok(())
    }

    // ── Admin dashboard ──

    /// Aggregate counts and recent books for the admin dashboard.
    pub fn dashboard(&self) -> Result<DashboardData, CatalogError> {
        let recent = {
            let rows = self
                .sql
                .query("SELECT data FROM books ORDER BY created_at DESC LIMIT 5", &[])
                .map_err(|e| CatalogError::Storage(e.to_string()))?;
            rows.iter()
                .map(from_data_column)
                .collect::<Result<Vec<Book>, _>>()?
        };

        Ok(DashboardData {
            recent_books: recent,
            books: self.count("SELECT COUNT(*) AS cnt FROM books")?,
            comments: self.count("SELECT COUNT(*) AS cnt FROM comments")?,
            drafts: self.count("SELECT COUNT(*) AS cnt FROM books WHERE published = 0")?,
        })
    }

    fn count(&self, sql: &str) -> Result<usize, CatalogError> {
        let rows = self
            .sql
            .query(sql, &[])
            .map_err(|e| CatalogError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0) as usize)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CatalogError> {
    serde_json::to_string(value).map_err(|e| CatalogError::Internal(e.to_string()))
}

fn from_data_column<T: DeserializeOwned>(row: &bookstore_sql::Row) -> Result<T, CatalogError> {
    let data = row
        .get_str("data")
        .ok_or_else(|| CatalogError::Internal("missing data column".into()))?;
    serde_json::from_str(data).map_err(|e| CatalogError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bookstore_sql::sqlite::SqliteStore;

    use super::*;

    fn service() -> Arc<CatalogService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        CatalogService::new(sql).unwrap()
    }

    fn sample_book(title: &str, published: bool) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            author: "Author".to_string(),
            description: String::new(),
            genre: "fiction".to_string(),
            image: String::new(),
            rating: 4.0,
            published,
        }
    }

    #[test]
    fn book_crud() {
        let svc = service();

        let book = svc.add_book(sample_book("Dune", true)).unwrap();
        assert_eq!(svc.get_book(&book.id).unwrap().title, "Dune");

        svc.delete_book(&book.id).unwrap();
        assert!(svc.get_book(&book.id).is_err());
        assert!(svc.delete_book(&book.id).is_err());
    }

    #[test]
    fn published_filter() {
        let svc = service();
        svc.add_book(sample_book("Public", true)).unwrap();
        svc.add_book(sample_book("Draft", false)).unwrap();

        let public = svc.list_books(true).unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].title, "Public");

        let all = svc.list_books(false).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn toggle_publish_flips() {
        let svc = service();
        let book = svc.add_book(sample_book("Draft", false)).unwrap();

        assert!(svc.toggle_publish(&book.id).unwrap());
        assert_eq!(svc.list_books(true).unwrap().len(), 1);
        assert!(!svc.toggle_publish(&book.id).unwrap());
        assert!(svc.list_books(true).unwrap().is_empty());
    }

    #[test]
    fn comment_approval_flow() {
        let svc = service();
        let book = svc.add_book(sample_book("Dune", true)).unwrap();

        let comment = svc
            .add_comment(CreateComment {
                book_id: book.id.clone(),
                name: "Reader".to_string(),
                content: "Great".to_string(),
            })
            .unwrap();

        // Unapproved comments stay off the public listing.
        assert!(svc.comments_for_book(&book.id).unwrap().is_empty());
        assert_eq!(svc.all_comments().unwrap().len(), 1);

        svc.approve_comment(&comment.id).unwrap();
        assert_eq!(svc.comments_for_book(&book.id).unwrap().len(), 1);

        svc.delete_comment(&comment.id).unwrap();
        assert!(svc.all_comments().unwrap().is_empty());
    }

    #[test]
    fn comment_requires_known_book() {
        let svc = service();
        let err = svc
            .add_comment(CreateComment {
                book_id: "ghost".to_string(),
                name: "Reader".to_string(),
                content: "Hello".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound(_)));
    }

    #[test]
    fn dashboard_counts() {
        let svc = service();
        let book = svc.add_book(sample_book("Public", true)).unwrap();
        svc.add_book(sample_book("Draft", false)).unwrap();
        svc.add_comment(CreateComment {
            book_id: book.id.clone(),
            name: "Reader".to_string(),
            content: "Hi".to_string(),
        })
        .unwrap();

        let dash = svc.dashboard().unwrap();
        assert_eq!(dash.books, 2);
        assert_eq!(dash.comments, 1);
        assert_eq!(dash.drafts, 1);
        assert_eq!(dash.recent_books.len(), 2);
    }
}
