//! Plant archive cascade.
//!
//! Archiving retires a plant's whole subtree (plant, timelapses, feed,
//! feed entries, feed media) from sync tracking on the originating end
//! and dirties every peer so they learn about the archive on their next
//! pull. The cascade walks top-down and is not transactional: a failure
//! partway leaves earlier collections retired and later ones pending,
//! which a retry of the idempotent request repairs.

use crate::access::Actor;
use crate::error::{EngineError, EngineResult};
use growlog_model::{Collection, Object, ObjectId, OwnedObject, Plant};
use growlog_store::{EntityStore, Store};

/// Archives a plant and cascades over its subtree.
pub fn archive_plant<S: Store>(
    store: &S,
    actor: Actor,
    plant_id: ObjectId,
    now_ms: u64,
) -> EngineResult<()> {
    let mut plant: Plant = EntityStore::<Plant>::get(store, plant_id)?.ok_or(
        EngineError::NotFound {
            collection: Collection::Plants,
            id: plant_id,
        },
    )?;
    if plant.owner() != Some(actor.user_id) {
        return Err(EngineError::OwnershipMismatch);
    }

    plant.archived = true;
    plant.stamp(now_ms);
    EntityStore::<Plant>::update(store, &plant)?;

    let feed_id = plant.feed_id;
    let timelapses = store.timelapse_ids_of_plant(plant_id)?;
    let entries = store.entry_ids_of_feed(feed_id)?;
    let medias = store.media_ids_of_entries(&entries)?;

    retire(store, actor, Collection::Plants, &[plant_id])?;
    retire(store, actor, Collection::Timelapses, &timelapses)?;
    retire(store, actor, Collection::Feeds, &[feed_id])?;
    retire(store, actor, Collection::FeedEntries, &entries)?;
    retire(store, actor, Collection::FeedMedias, &medias)?;

    tracing::info!(
        plant = %plant_id,
        timelapses = timelapses.len(),
        entries = entries.len(),
        medias = medias.len(),
        "archived plant subtree"
    );
    Ok(())
}

/// Deletes the originator's shadow rows for `ids` and dirties every
/// peer end's rows.
fn retire<S: Store>(
    store: &S,
    actor: Actor,
    collection: Collection,
    ids: &[ObjectId],
) -> EngineResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    store.delete_shadows_for_end(collection, ids, actor.end_id)?;
    for id in ids {
        store.mark_dirty_except(collection, *id, actor.end_id, actor.user_id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use growlog_testkit::DiaryFixture;
    use growlog_store::ShadowStore;

    #[test]
    fn cascade_retires_the_originator_and_dirties_peers() {
        let fx = DiaryFixture::with_plant_subtree();
        let actor = Actor::new(fx.user, fx.phone);
        archive_plant(&fx.store, actor, fx.plant_id, 99).unwrap();

        let plant: Plant = fx.store.get(fx.plant_id).unwrap().unwrap();
        assert!(plant.archived);

        // Originator's rows are gone across the whole subtree.
        for (collection, id) in fx.subtree() {
            assert!(
                fx.store.shadow(collection, fx.phone, id).unwrap().is_none(),
                "{collection} row should be gone on the originator"
            );
            let peer = fx.store.shadow(collection, fx.tablet, id).unwrap().unwrap();
            assert!(peer.dirty, "{collection} row should be dirty on the peer");
        }
    }

    #[test]
    fn archiving_a_foreign_plant_is_denied() {
        let fx = DiaryFixture::with_plant_subtree();
        let stranger = Actor::new(growlog_model::UserId::random(), fx.tablet);
        let err = archive_plant(&fx.store, stranger, fx.plant_id, 99).unwrap_err();
        assert!(matches!(err, EngineError::OwnershipMismatch));
    }

    #[test]
    fn archiving_a_missing_plant_is_not_found() {
        let fx = DiaryFixture::with_plant_subtree();
        let actor = Actor::new(fx.user, fx.phone);
        let err = archive_plant(&fx.store, actor, ObjectId::random(), 99).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }
}
