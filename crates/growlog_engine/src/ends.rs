//! End registration.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use growlog_model::{
    Device, End, EndId, Feed, FeedEntry, FeedMedia, GrowBox, Object, Plant, ShadowRow, Syncable,
    Timelapse, UserId,
};
use growlog_store::{EntityStore, Store};

/// Registers a new end under a user.
///
/// With [`EngineConfig::backfill_new_ends`] on, the new end is seeded
/// with a dirty shadow row for every live record the user already owns,
/// so its first pull downloads the whole diary. Deleted and archived
/// records are left out; those ship nothing an offline-first client
/// needs.
pub fn register_end<S: Store>(
    store: &S,
    config: &EngineConfig,
    user_id: UserId,
    name: String,
    now_ms: u64,
) -> EngineResult<EndId> {
    let end = End {
        id: None,
        user_id: Some(user_id),
        name,
        cat: now_ms,
        uat: now_ms,
    };
    let end_id = store.insert_end(&end)?;

    if config.backfill_new_ends {
        let mut seeded = 0;
        seeded += backfill::<S, GrowBox>(store, user_id, end_id)?;
        seeded += backfill::<S, Plant>(store, user_id, end_id)?;
        seeded += backfill::<S, Timelapse>(store, user_id, end_id)?;
        seeded += backfill::<S, Device>(store, user_id, end_id)?;
        seeded += backfill::<S, Feed>(store, user_id, end_id)?;
        seeded += backfill::<S, FeedEntry>(store, user_id, end_id)?;
        seeded += backfill::<S, FeedMedia>(store, user_id, end_id)?;
        tracing::info!(end = %end_id, seeded, "registered end with backfill");
    } else {
        tracing::info!(end = %end_id, "registered end");
    }
    Ok(end_id)
}

fn backfill<S: Store + EntityStore<E>, E: Syncable>(
    store: &S,
    user_id: UserId,
    end_id: EndId,
) -> EngineResult<u64> {
    let mut seeded = 0;
    for entity in EntityStore::<E>::list_owned(store, user_id)? {
        if entity.deleted() {
            continue;
        }
        let Some(id) = entity.id() else { continue };
        if store.aggregate_archived(E::COLLECTION, id)? {
            continue;
        }
        store.insert_shadow(E::COLLECTION, ShadowRow::pending(end_id, id))?;
        seeded += 1;
    }
    Ok(seeded)
}
