use bookstore_sql::SQLStore;

use crate::service::IdentityError;

/// Initialize the SQLite schema for identity resources.
///
/// Users use plain columns rather than a JSON data blob: the reconciler's
/// single-statement upsert must be able to update email and name while
/// leaving created_at untouched.
pub fn init_schema(sql: &dyn SQLStore) -> Result<(), IdentityError> {
    let statements = [
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL DEFAULT '',
            password_hash TEXT,
            created_at TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",

        // Sessions: one row per refresh token. Rotation revokes the old
        // row and inserts a new one.
        "CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            refresh_token TEXT NOT NULL UNIQUE,
            revoked INTEGER NOT NULL DEFAULT 0,
            issued_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id)",
    ];

    for stmt in &statements {
        sql.exec(stmt, &[])
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
    }

    Ok(())
}
