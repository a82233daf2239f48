//! A write-counting store wrapper.

use growlog_model::{Collection, End, EndId, ObjectId, ShadowRow, Syncable, User, UserId};
use growlog_store::{
    DiaryIndex, EndStore, EntityStore, Lifecycle, MemoryStore, ShadowStore, StoreResult, UserStore,
};
use std::sync::atomic::{AtomicU64, Ordering};

/// Wraps a [`MemoryStore`] and counts every mutating call.
///
/// Used to assert that rejected requests leave storage untouched: run
/// the operation, then check [`RecordingStore::writes`] is unchanged.
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    writes: AtomicU64,
}

impl RecordingStore {
    /// Wraps an already-seeded store.
    #[must_use]
    pub fn wrap(inner: MemoryStore) -> Self {
        Self {
            inner,
            writes: AtomicU64::new(0),
        }
    }

    /// The number of mutating store calls seen so far.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

impl<E: Syncable> EntityStore<E> for RecordingStore
where
    MemoryStore: EntityStore<E>,
{
    fn get(&self, id: ObjectId) -> StoreResult<Option<E>> {
        EntityStore::<E>::get(&self.inner, id)
    }

    fn insert(&self, entity: &E) -> StoreResult<ObjectId> {
        self.record();
        EntityStore::<E>::insert(&self.inner, entity)
    }

    fn update(&self, entity: &E) -> StoreResult<()> {
        self.record();
        EntityStore::<E>::update(&self.inner, entity)
    }

    fn list_owned(&self, user_id: UserId) -> StoreResult<Vec<E>> {
        EntityStore::<E>::list_owned(&self.inner, user_id)
    }
}

impl EndStore for RecordingStore {
    fn insert_end(&self, end: &End) -> StoreResult<EndId> {
        self.record();
        self.inner.insert_end(end)
    }

    fn get_end(&self, id: EndId) -> StoreResult<Option<End>> {
        self.inner.get_end(id)
    }

    fn ends_for_user(&self, user_id: UserId) -> StoreResult<Vec<End>> {
        self.inner.ends_for_user(user_id)
    }
}

impl UserStore for RecordingStore {
    fn insert_user(&self, user: &User) -> StoreResult<UserId> {
        self.record();
        self.inner.insert_user(user)
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.inner.get_user(id)
    }

    fn user_by_handle(&self, handle: &str) -> StoreResult<Option<User>> {
        self.inner.user_by_handle(handle)
    }
}

impl ShadowStore for RecordingStore {
    fn insert_shadow(&self, collection: Collection, row: ShadowRow) -> StoreResult<()> {
        self.record();
        self.inner.insert_shadow(collection, row)
    }

    fn shadow(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<Option<ShadowRow>> {
        self.inner.shadow(collection, end_id, object_id)
    }

    fn dirty_objects_for_end(
        &self,
        collection: Collection,
        end_id: EndId,
    ) -> StoreResult<Vec<ObjectId>> {
        self.inner.dirty_objects_for_end(collection, end_id)
    }

    fn mark_dirty_except(
        &self,
        collection: Collection,
        object_id: ObjectId,
        originator: EndId,
        owner: UserId,
    ) -> StoreResult<u64> {
        self.record();
        self.inner
            .mark_dirty_except(collection, object_id, originator, owner)
    }

    fn clear_dirty(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<()> {
        self.record();
        self.inner.clear_dirty(collection, end_id, object_id)
    }

    fn delete_shadow(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<()> {
        self.record();
        self.inner.delete_shadow(collection, end_id, object_id)
    }

    fn delete_shadows_for_end(
        &self,
        collection: Collection,
        object_ids: &[ObjectId],
        end_id: EndId,
    ) -> StoreResult<u64> {
        self.record();
        self.inner
            .delete_shadows_for_end(collection, object_ids, end_id)
    }
}

impl DiaryIndex for RecordingStore {
    fn owner_of(&self, collection: Collection, id: ObjectId) -> StoreResult<Option<UserId>> {
        self.inner.owner_of(collection, id)
    }

    fn lifecycle_of(
        &self,
        collection: Collection,
        id: ObjectId,
    ) -> StoreResult<Option<Lifecycle>> {
        self.inner.lifecycle_of(collection, id)
    }

    fn aggregate_archived(&self, collection: Collection, id: ObjectId) -> StoreResult<bool> {
        self.inner.aggregate_archived(collection, id)
    }

    fn timelapse_ids_of_plant(&self, plant_id: ObjectId) -> StoreResult<Vec<ObjectId>> {
        self.inner.timelapse_ids_of_plant(plant_id)
    }

    fn entry_ids_of_feed(&self, feed_id: ObjectId) -> StoreResult<Vec<ObjectId>> {
        self.inner.entry_ids_of_feed(feed_id)
    }

    fn media_ids_of_entries(&self, entry_ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>> {
        self.inner.media_ids_of_entries(entry_ids)
    }
}
