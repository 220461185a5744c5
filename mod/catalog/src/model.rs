use serde::{Deserialize, Serialize};

/// A book in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    /// Cover image URL.
    #[serde(default)]
    pub image: String,
    /// Average rating, 0–5.
    #[serde(default)]
    pub rating: f64,
    /// Unpublished books are drafts, visible only to the admin surface.
    #[serde(default)]
    pub published: bool,
    pub created_at: String,
}

/// Input for creating a book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub published: bool,
}

/// A reader comment on a book.
///
/// Comments start unapproved and only show publicly once the admin
/// approves them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub book_id: String,
    /// Commenter display name.
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub approved: bool,
    pub created_at: String,
}

/// Input for creating a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub book_id: String,
    pub name: String,
    pub content: String,
}

/// Admin dashboard aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub recent_books: Vec<Book>,
    pub books: usize,
    pub comments: usize,
    pub drafts: usize,
}
