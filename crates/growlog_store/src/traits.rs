//! Storage service traits.

use crate::error::StoreResult;
use growlog_model::{
    Collection, Device, End, EndId, Feed, FeedEntry, FeedMedia, GrowBox, ObjectId, Plant,
    ShadowRow, Syncable, Timelapse, User, UserId,
};

/// Typed record access for one syncable entity kind.
pub trait EntityStore<E: Syncable> {
    /// Fetches a record by primary key.
    fn get(&self, id: ObjectId) -> StoreResult<Option<E>>;

    /// Inserts a record, minting and returning its primary key.
    fn insert(&self, entity: &E) -> StoreResult<ObjectId>;

    /// Replaces the full row. Fails with `NotFound` if the record does
    /// not exist. This is a whole-row replace, not a partial patch.
    fn update(&self, entity: &E) -> StoreResult<()>;

    /// Lists every record owned by a user, ordered by creation time.
    fn list_owned(&self, user_id: UserId) -> StoreResult<Vec<E>>;
}

/// Access to registered ends (client installations).
pub trait EndStore {
    /// Inserts an end, minting and returning its ID.
    fn insert_end(&self, end: &End) -> StoreResult<EndId>;

    /// Fetches an end by ID.
    fn get_end(&self, id: EndId) -> StoreResult<Option<End>>;

    /// Lists all ends registered under a user.
    fn ends_for_user(&self, user_id: UserId) -> StoreResult<Vec<End>>;
}

/// Access to user accounts.
pub trait UserStore {
    /// Inserts a user, minting and returning its ID.
    fn insert_user(&self, user: &User) -> StoreResult<UserId>;

    /// Fetches a user by ID.
    fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Looks a user up by normalized handle (lowercased, spaces removed).
    fn user_by_handle(&self, handle: &str) -> StoreResult<Option<User>>;
}

/// Shadow-row bookkeeping, one logical table per collection.
///
/// Only the mutation pipeline writes shadow rows; the pull endpoint reads
/// them and acknowledgment clears them.
pub trait ShadowStore {
    /// Inserts one shadow row.
    fn insert_shadow(&self, collection: Collection, row: ShadowRow) -> StoreResult<()>;

    /// Fetches the shadow row for one (end, object) pair.
    fn shadow(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<Option<ShadowRow>>;

    /// Object IDs whose shadow row for this end is dirty.
    fn dirty_objects_for_end(
        &self,
        collection: Collection,
        end_id: EndId,
    ) -> StoreResult<Vec<ObjectId>>;

    /// Sets `dirty = true` on every shadow row for `object_id` whose end
    /// is not the originator and belongs to `owner`. Executed as one
    /// atomic statement, never a per-row loop, so it stays correct
    /// under concurrent updates to the same object. Returns the number of
    /// rows touched.
    fn mark_dirty_except(
        &self,
        collection: Collection,
        object_id: ObjectId,
        originator: EndId,
        owner: UserId,
    ) -> StoreResult<u64>;

    /// Acknowledges one row: `dirty = false`, `sent = true`. Fails with
    /// `NotFound` if no such row exists.
    fn clear_dirty(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<()>;

    /// Physically removes one shadow row. Removing a missing row is a
    /// no-op.
    fn delete_shadow(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<()>;

    /// Removes this end's shadow rows for a set of objects in one
    /// statement. Returns the number of rows removed.
    fn delete_shadows_for_end(
        &self,
        collection: Collection,
        object_ids: &[ObjectId],
        end_id: EndId,
    ) -> StoreResult<u64>;
}

/// Soft-delete and archive state of a record, collection-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    /// The record's own soft-delete flag.
    pub deleted: bool,
    /// The record's own archive flag (false for non-aggregates).
    pub archived: bool,
}

/// Cross-collection lookups the access gate, cascade engine and backlog
/// backfill issue. A SQL backend would answer each with a subquery
/// ("feedid in (select id from feeds where ...)").
pub trait DiaryIndex {
    /// The owning user of a record in any registered collection, if the
    /// record exists.
    fn owner_of(&self, collection: Collection, id: ObjectId) -> StoreResult<Option<UserId>>;

    /// Soft-delete/archive state of a record in any registered
    /// collection, if the record exists.
    fn lifecycle_of(&self, collection: Collection, id: ObjectId)
        -> StoreResult<Option<Lifecycle>>;

    /// Whether the plant aggregate above this record is archived.
    /// For plants this is their own archive flag; for boxes and devices
    /// (outside any plant subtree) it is always false.
    fn aggregate_archived(&self, collection: Collection, id: ObjectId) -> StoreResult<bool>;

    /// Timelapses filming a plant.
    fn timelapse_ids_of_plant(&self, plant_id: ObjectId) -> StoreResult<Vec<ObjectId>>;

    /// Entries of a feed.
    fn entry_ids_of_feed(&self, feed_id: ObjectId) -> StoreResult<Vec<ObjectId>>;

    /// Media attached to any of the given entries.
    fn media_ids_of_entries(&self, entry_ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>>;
}

/// The full storage surface the sync core requires.
///
/// Blanket-implemented for anything providing all the component traits,
/// so test doubles only implement what they intercept and delegate the
/// rest.
pub trait Store:
    EntityStore<GrowBox>
    + EntityStore<Plant>
    + EntityStore<Timelapse>
    + EntityStore<Device>
    + EntityStore<Feed>
    + EntityStore<FeedEntry>
    + EntityStore<FeedMedia>
    + ShadowStore
    + EndStore
    + UserStore
    + DiaryIndex
    + Send
    + Sync
{
}

impl<T> Store for T where
    T: EntityStore<GrowBox>
        + EntityStore<Plant>
        + EntityStore<Timelapse>
        + EntityStore<Device>
        + EntityStore<Feed>
        + EntityStore<FeedEntry>
        + EntityStore<FeedMedia>
        + ShadowStore
        + EndStore
        + UserStore
        + DiaryIndex
        + Send
        + Sync
{
}
