/// A normalized identity-provider event.
///
/// Produced once by the normalizer so downstream code is an exhaustive
/// match, not string comparisons scattered through the reconciler.
/// `Unrecognized` is not an error: the delivery is acknowledged and
/// nothing else happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    Created {
        id: String,
        email: String,
        name: String,
    },
    Updated {
        id: String,
        email: String,
        name: String,
    },
    Deleted {
        id: String,
    },
    Unrecognized {
        kind: String,
    },
}
