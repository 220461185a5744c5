//! Identity reconciliation — applying normalized events to the store.

use bookstore_sql::Value;

use bookstore_core::now_rfc3339;

use crate::model::UserEvent;
use crate::service::{IdentityError, IdentityService};

/// Outcome of applying a normalized event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Upserted,
    Deleted,
    Skipped,
}

impl IdentityService {
    /// Apply a normalized provider event to the local user store.
    ///
    /// Created and Updated share one code path: an upsert keyed on the
    /// external identity. The provider delivers at-least-once and out of
    /// order, so the two kinds must commute — an Updated arriving before
    /// its Created still produces the correct record. Deleting an absent
    /// identity is a no-op, which makes redelivered deletes harmless.
    pub fn apply_event(&self, event: UserEvent) -> Result<Applied, IdentityError> {
        match event {
            UserEvent::Created { id, email, name } | UserEvent::Updated { id, email, name } => {
                self.upsert_identity(&id, &email, &name)?;
                Ok(Applied::Upserted)
            }
            UserEvent::Deleted { id } => {
                self.delete_identity(&id)?;
                Ok(Applied::Deleted)
            }
            UserEvent::Unrecognized { kind } => {
                tracing::debug!(kind = %kind, "ignoring unrecognized event kind");
                Ok(Applied::Skipped)
            }
        }
    }

    /// Upsert a provider identity. Single statement, so per-identity
    /// serialization comes from the store itself. created_at and any
    /// password hash survive updates.
    fn upsert_identity(&self, id: &str, email: &str, name: &str) -> Result<(), IdentityError> {
        let now = now_rfc3339();
        self.sql
            .exec(
                "INSERT INTO users (id, email, name, created_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET email = excluded.email, name = excluded.name",
                &[
                    Value::Text(id.to_string()),
                    Value::Text(email.to_string()),
                    Value::Text(name.to_string()),
                    Value::Text(now),
                ],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Delete a provider identity. Sessions and wishlist rows go with it
    /// via FK cascade. Zero rows affected is success.
    fn delete_identity(&self, id: &str) -> Result<(), IdentityError> {
        self.sql
            .exec(
                "DELETE FROM users WHERE id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| IdentityError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::test_service;

    fn created(id: &str, email: &str, name: &str) -> UserEvent {
        UserEvent::Created {
            id: id.into(),
            email: email.into(),
            name: name.into(),
        }
    }

    fn updated(id: &str, email: &str, name: &str) -> UserEvent {
        UserEvent::Updated {
            id: id.into(),
            email: email.into(),
            name: name.into(),
        }
    }

    #[test]
    fn created_then_updated() {
        let svc = test_service();
        svc.apply_event(created("u1", "a@x.com", "A B")).unwrap();
        svc.apply_event(updated("u1", "a2@x.com", "A C")).unwrap();

        let user = svc.get_user("u1").unwrap();
        assert_eq!(user.email, "a2@x.com");
        assert_eq!(user.name, "A C");
    }

    #[test]
    fn updated_before_created_commutes() {
        // The provider does not guarantee delivery order; an Updated for
        // an unseen identity must still produce a record.
        let svc = test_service();
        svc.apply_event(updated("u1", "a2@x.com", "A C")).unwrap();

        let user = svc.get_user("u1").unwrap();
        assert_eq!(user.email, "a2@x.com");

        // Late-arriving Created is just another upsert.
        svc.apply_event(created("u1", "a2@x.com", "A C")).unwrap();
        let user = svc.get_user("u1").unwrap();
        assert_eq!(user.email, "a2@x.com");
        assert_eq!(user.name, "A C");
    }

    #[test]
    fn final_state_matches_last_event_regardless_of_order() {
        let events = [
            created("u1", "a@x.com", "A B"),
            updated("u1", "b@x.com", "A C"),
            updated("u1", "c@x.com", "A D"),
        ];

        // Apply in order, then redeliver an earlier event last — the
        // record reflects whatever was applied last, and redelivery of
        // the final event restores it.
        let svc = test_service();
        for e in &events {
            svc.apply_event(e.clone()).unwrap();
        }
        svc.apply_event(events[1].clone()).unwrap();
        svc.apply_event(events[2].clone()).unwrap();

        let user = svc.get_user("u1").unwrap();
        assert_eq!(user.email, "c@x.com");
        assert_eq!(user.name, "A D");
    }

    #[test]
    fn delete_is_idempotent() {
        let svc = test_service();
        svc.apply_event(created("u1", "a@x.com", "A")).unwrap();

        assert_eq!(
            svc.apply_event(UserEvent::Deleted { id: "u1".into() }).unwrap(),
            Applied::Deleted
        );
        assert!(svc.get_user("u1").is_err());

        // Redelivered delete, and delete of a never-seen identity.
        assert_eq!(
            svc.apply_event(UserEvent::Deleted { id: "u1".into() }).unwrap(),
            Applied::Deleted
        );
        assert_eq!(
            svc.apply_event(UserEvent::Deleted { id: "ghost".into() }).unwrap(),
            Applied::Deleted
        );
    }

    #[test]
    fn unrecognized_is_skipped() {
        let svc = test_service();
        assert_eq!(
            svc.apply_event(UserEvent::Unrecognized {
                kind: "organization.created".into()
            })
            .unwrap(),
            Applied::Skipped
        );
    }

    #[test]
    fn email_owned_by_other_identity_is_a_store_error() {
        let svc = test_service();
        svc.apply_event(created("u1", "a@x.com", "A")).unwrap();
        svc.apply_event(created("u2", "b@x.com", "B")).unwrap();

        let err = svc
            .apply_event(updated("u2", "a@x.com", "B"))
            .unwrap_err();
        assert!(matches!(err, IdentityError::Storage(_)));

        // u2 is untouched.
        let user = svc.get_user("u2").unwrap();
        assert_eq!(user.email, "b@x.com");
    }

    #[test]
    fn normalized_payloads_flow_through() {
        // The full pipeline minus HTTP: raw payload → normalize → apply.
        use crate::service::event::normalize;

        let svc = test_service();
        let created = br#"{"type":"user.created","data":{"id":"u1","email":"a@x.com","first_name":"A","last_name":"B"}}"#;
        let updated = br#"{"type":"user.updated","data":{"id":"u1","email":"a2@x.com","first_name":"A","last_name":"C"}}"#;

        svc.apply_event(normalize(created).unwrap()).unwrap();
        svc.apply_event(normalize(updated).unwrap()).unwrap();

        let user = svc.get_user("u1").unwrap();
        assert_eq!(user.email, "a2@x.com");
        assert_eq!(user.name, "A C");
    }

    #[test]
    fn upsert_preserves_created_at() {
        let svc = test_service();
        svc.apply_event(created("u1", "a@x.com", "A")).unwrap();
        let before = svc.get_user("u1").unwrap().created_at;

        svc.apply_event(updated("u1", "a2@x.com", "A2")).unwrap();
        let after = svc.get_user("u1").unwrap().created_at;
        assert_eq!(before, after);
    }
}
