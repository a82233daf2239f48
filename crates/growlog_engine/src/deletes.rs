//! Batch soft-deletion.
//!
//! Clients buffer local deletions offline and flush them in one batch.
//! The batch is forgiving: items naming an unknown collection, a missing
//! record, or a record owned by someone else are skipped with a warning
//! instead of failing the whole request, so one stale item cannot wedge
//! a client's delete queue forever.

use crate::access::Actor;
use crate::error::EngineResult;
use growlog_model::{
    Collection, Device, Feed, FeedEntry, FeedMedia, GrowBox, Object, ObjectId, OwnedObject, Plant,
    Syncable, Timelapse,
};
use growlog_store::{EntityStore, Store};

/// One item of a delete batch. The collection name arrives as a wire
/// string so unknown values can be skipped rather than rejected.
#[derive(Debug, Clone)]
pub struct DeleteItem {
    /// Wire collection name ("plants", "feedentries", ...).
    pub kind: String,
    /// The record to soft-delete.
    pub id: ObjectId,
}

/// What a delete batch did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Records soft-deleted.
    pub deleted: u64,
    /// Items skipped (unknown collection, missing or foreign record).
    pub skipped: u64,
}

/// Applies a batch of soft-deletes for the acting end.
pub fn apply_deletes<S: Store>(
    store: &S,
    actor: Actor,
    items: &[DeleteItem],
    now_ms: u64,
) -> EngineResult<DeleteOutcome> {
    let mut outcome = DeleteOutcome::default();
    for item in items {
        let Ok(collection) = item.kind.parse::<Collection>() else {
            tracing::warn!(kind = %item.kind, object = %item.id, "skipping delete for unknown collection");
            outcome.skipped += 1;
            continue;
        };
        let done = match collection {
            Collection::Boxes => soft_delete::<S, GrowBox>(store, actor, item.id, now_ms)?,
            Collection::Plants => soft_delete::<S, Plant>(store, actor, item.id, now_ms)?,
            Collection::Timelapses => soft_delete::<S, Timelapse>(store, actor, item.id, now_ms)?,
            Collection::Devices => soft_delete::<S, Device>(store, actor, item.id, now_ms)?,
            Collection::Feeds => soft_delete::<S, Feed>(store, actor, item.id, now_ms)?,
            Collection::FeedEntries => soft_delete::<S, FeedEntry>(store, actor, item.id, now_ms)?,
            Collection::FeedMedias => soft_delete::<S, FeedMedia>(store, actor, item.id, now_ms)?,
        };
        if done {
            outcome.deleted += 1;
        } else {
            outcome.skipped += 1;
        }
    }
    Ok(outcome)
}

/// Soft-deletes one record: flips the flag, drops the originator's
/// shadow row, dirties every peer so they pull the tombstone.
fn soft_delete<S: Store + EntityStore<E>, E: Syncable>(
    store: &S,
    actor: Actor,
    id: ObjectId,
    now_ms: u64,
) -> EngineResult<bool> {
    let Some(mut entity) = EntityStore::<E>::get(store, id)? else {
        tracing::warn!(collection = %E::COLLECTION, object = %id, "skipping delete for missing record");
        return Ok(false);
    };
    if entity.owner() != Some(actor.user_id) {
        tracing::warn!(collection = %E::COLLECTION, object = %id, "skipping delete for foreign record");
        return Ok(false);
    }

    entity.set_deleted(true);
    entity.stamp(now_ms);
    EntityStore::<E>::update(store, &entity)?;
    store.delete_shadow(E::COLLECTION, actor.end_id, id)?;
    store.mark_dirty_except(E::COLLECTION, id, actor.end_id, actor.user_id)?;
    Ok(true)
}
