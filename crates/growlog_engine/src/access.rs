//! Request attribution and ownership checks.

use crate::error::{EngineError, EngineResult};
use growlog_model::{Collection, EndId, ObjectId, UserId};
use growlog_store::Store;

/// The authenticated (user, end) pair a request acts as.
///
/// Every sync-relevant mutation is attributed to exactly one end; the
/// end decides which shadow row is born `sent` and which peers get
/// dirtied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// The authenticated user.
    pub user_id: UserId,
    /// The end (client installation) the request came from.
    pub end_id: EndId,
}

impl Actor {
    /// Creates an actor from token claims.
    #[must_use]
    pub fn new(user_id: UserId, end_id: EndId) -> Self {
        Self { user_id, end_id }
    }
}

/// Checks that a referenced record exists and belongs to `user_id`.
///
/// A missing record is `NotFound` (the reference is bad), a foreign one
/// is `OwnershipMismatch` (the reference is someone else's).
pub fn require_owned<S: Store>(
    store: &S,
    collection: Collection,
    id: ObjectId,
    user_id: UserId,
) -> EngineResult<()> {
    match store.owner_of(collection, id)? {
        None => Err(EngineError::NotFound { collection, id }),
        Some(owner) if owner != user_id => Err(EngineError::OwnershipMismatch),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use growlog_model::Feed;
    use growlog_store::{EntityStore, MemoryStore};

    #[test]
    fn missing_and_foreign_records_fail_differently() {
        let store = MemoryStore::new();
        let owner = UserId::random();
        let feed = Feed {
            id: None,
            user_id: Some(owner),
            name: "feed".into(),
            deleted: false,
            cat: 1,
            uat: 1,
        };
        let id = EntityStore::<Feed>::insert(&store, &feed).unwrap();

        assert!(require_owned(&store, Collection::Feeds, id, owner).is_ok());
        assert!(matches!(
            require_owned(&store, Collection::Feeds, ObjectId::random(), owner),
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(
            require_owned(&store, Collection::Feeds, id, UserId::random()),
            Err(EngineError::OwnershipMismatch)
        ));
    }
}
