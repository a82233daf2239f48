//! Pull and acknowledgment.
//!
//! A pull returns every record whose shadow row for the calling end is
//! dirty; it is read-only and idempotent, so a dropped response costs
//! nothing. Acknowledgment is the only thing that clears a row, and for
//! records that have left the live set (soft-deleted or archived) it
//! removes the row entirely instead.

use crate::access::Actor;
use crate::error::{EngineError, EngineResult};
use growlog_model::{Object, ObjectId, Syncable};
use growlog_store::{EntityStore, Store};

/// Returns the actor's dirty backlog for one collection, ordered by
/// creation time so parents replay before children created after them.
pub fn backlog<S: Store + EntityStore<E>, E: Syncable>(
    store: &S,
    actor: Actor,
) -> EngineResult<Vec<E>> {
    let ids = store.dirty_objects_for_end(E::COLLECTION, actor.end_id)?;
    let mut items: Vec<E> = Vec::with_capacity(ids.len());
    for id in ids {
        match EntityStore::<E>::get(store, id)? {
            Some(entity) => items.push(entity),
            // A row can outlive its record if a hard cleanup raced us.
            None => tracing::warn!(
                collection = %E::COLLECTION,
                object = %id,
                "dirty shadow row without a record"
            ),
        }
    }
    items.sort_by_key(|e| (e.created_at(), e.id()));
    Ok(items)
}

/// Acknowledges one pulled record for the calling end.
///
/// Live records get `dirty = false, sent = true` and will reappear on
/// the next edit; deleted or archived records have their shadow row
/// deleted, ending sync tracking for this end.
pub fn acknowledge<S: Store, E: Syncable>(
    store: &S,
    actor: Actor,
    object_id: ObjectId,
) -> EngineResult<()> {
    let not_found = || EngineError::NotFound {
        collection: E::COLLECTION,
        id: object_id,
    };
    store
        .shadow(E::COLLECTION, actor.end_id, object_id)?
        .ok_or_else(not_found)?;
    let owner = store.owner_of(E::COLLECTION, object_id)?.ok_or_else(not_found)?;
    if owner != actor.user_id {
        return Err(EngineError::OwnershipMismatch);
    }

    let lifecycle = store
        .lifecycle_of(E::COLLECTION, object_id)?
        .ok_or_else(not_found)?;
    let retired = lifecycle.deleted || store.aggregate_archived(E::COLLECTION, object_id)?;
    if retired {
        store.delete_shadow(E::COLLECTION, actor.end_id, object_id)?;
    } else {
        store.clear_dirty(E::COLLECTION, actor.end_id, object_id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{insert_pipeline, MutationContext};
    use growlog_model::{Collection, End, EndId, Feed, UserId};
    use growlog_store::{EndStore, EntityStore, MemoryStore, ShadowStore};

    fn seed(store: &MemoryStore) -> (Actor, EndId) {
        let user = UserId::random();
        let add_end = |name: &str| {
            store
                .insert_end(&End {
                    id: None,
                    user_id: Some(user),
                    name: name.into(),
                    cat: 0,
                    uat: 0,
                })
                .unwrap()
        };
        let phone = add_end("phone");
        let tablet = add_end("tablet");
        (Actor::new(user, phone), tablet)
    }

    fn insert_feed(store: &MemoryStore, actor: Actor, name: &str, now: u64) -> ObjectId {
        let feed = Feed {
            id: None,
            user_id: None,
            name: name.into(),
            deleted: false,
            cat: 0,
            uat: 0,
        };
        let mut ctx = MutationContext::new(actor, feed, now);
        insert_pipeline::<MemoryStore, Feed>()
            .run(store, &mut ctx)
            .unwrap();
        ctx.object_id.unwrap()
    }

    #[test]
    fn backlog_is_ordered_by_creation_and_idempotent() {
        let store = MemoryStore::new();
        let (actor, tablet) = seed(&store);
        let second = insert_feed(&store, actor, "second", 20);
        let first = insert_feed(&store, actor, "first", 10);

        let tablet_actor = Actor::new(actor.user_id, tablet);
        let pulled: Vec<Feed> = backlog(&store, tablet_actor).unwrap();
        let ids: Vec<_> = pulled.iter().map(|f| f.id.unwrap()).collect();
        assert_eq!(ids, vec![first, second]);

        // Pulling again without acknowledging returns the same backlog.
        let again: Vec<Feed> = backlog(&store, tablet_actor).unwrap();
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn acknowledging_clears_the_row_until_the_next_edit() {
        let store = MemoryStore::new();
        let (actor, tablet) = seed(&store);
        let id = insert_feed(&store, actor, "diary", 10);

        let tablet_actor = Actor::new(actor.user_id, tablet);
        acknowledge::<_, Feed>(&store, tablet_actor, id).unwrap();

        assert!(backlog::<_, Feed>(&store, tablet_actor).unwrap().is_empty());
        let row = store.shadow(Collection::Feeds, tablet, id).unwrap().unwrap();
        assert!(row.sent && !row.dirty);
    }

    #[test]
    fn acknowledging_a_deleted_record_removes_the_row() {
        let store = MemoryStore::new();
        let (actor, tablet) = seed(&store);
        let id = insert_feed(&store, actor, "diary", 10);

        let mut feed: Feed = store.get(id).unwrap().unwrap();
        feed.deleted = true;
        growlog_store::EntityStore::<Feed>::update(&store, &feed).unwrap();

        let tablet_actor = Actor::new(actor.user_id, tablet);
        acknowledge::<_, Feed>(&store, tablet_actor, id).unwrap();
        assert!(store.shadow(Collection::Feeds, tablet, id).unwrap().is_none());
    }

    #[test]
    fn acknowledging_without_a_row_is_not_found() {
        let store = MemoryStore::new();
        let (actor, _) = seed(&store);
        let err = acknowledge::<_, Feed>(&store, actor, ObjectId::random()).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }
}
