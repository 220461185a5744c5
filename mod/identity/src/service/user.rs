use bookstore_sql::Value;

use bookstore_core::{new_id, now_rfc3339};

use crate::model::User;
use crate::service::{IdentityError, IdentityService};

impl IdentityService {
    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, IdentityError> {
        let rows = self
            .sql
            .query(
                "SELECT id, email, name, password_hash, created_at FROM users WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| IdentityError::NotFound(format!("user {}", id)))?;
        Self::user_from_row(row)
    }

    /// Find a user by email. Email is unique, so at most one row.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let rows = self
            .sql
            .query(
                "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?1",
                &[Value::Text(email.to_string())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        match rows.first() {
            Some(row) => Ok(Some(Self::user_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Insert a local password account. The id is locally issued — the
    /// session path never creates provider-identity records.
    pub(crate) fn insert_local_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, IdentityError> {
        let user = User {
            id: new_id(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: Some(password_hash.to_string()),
            created_at: now_rfc3339(),
        };

        self.sql
            .exec(
                "INSERT INTO users (id, email, name, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(user.id.clone()),
                    Value::Text(user.email.clone()),
                    Value::Text(user.name.clone()),
                    Value::Text(password_hash.to_string()),
                    Value::Text(user.created_at.clone()),
                ],
            )
            .map_err(|e| {
                if e.is_unique_violation() {
                    IdentityError::EmailTaken
                } else {
                    IdentityError::Storage(e.to_string())
                }
            })?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::UserEvent;
    use crate::service::test_support::test_service;

    #[test]
    fn find_by_email() {
        let svc = test_service();
        svc.apply_event(UserEvent::Created {
            id: "u1".into(),
            email: "a@x.com".into(),
            name: "A".into(),
        })
        .unwrap();

        let found = svc.find_user_by_email("a@x.com").unwrap();
        assert_eq!(found.unwrap().id, "u1");

        assert!(svc.find_user_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn provider_records_have_no_password_hash() {
        let svc = test_service();
        svc.apply_event(UserEvent::Created {
            id: "u1".into(),
            email: "a@x.com".into(),
            name: "A".into(),
        })
        .unwrap();

        let user = svc.get_user("u1").unwrap();
        assert!(user.password_hash.is_none());
    }
}
