//! In-memory store implementation.

use crate::error::{StoreError, StoreResult};
use crate::traits::{DiaryIndex, EndStore, EntityStore, Lifecycle, ShadowStore, UserStore};
use growlog_model::{
    Collection, Device, End, EndId, Feed, FeedEntry, FeedMedia, GrowBox, Object, ObjectId,
    OwnedObject, Plant, ShadowRow, Syncable, Timelapse, User, UserId,
};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory store.
///
/// Backs tests, the CLI demo, and ephemeral deployments. All state lives
/// behind a single `RwLock`, which is what makes the bulk shadow-row
/// statements ([`ShadowStore::mark_dirty_except`],
/// [`ShadowStore::delete_shadows_for_end`]) atomic with respect to
/// concurrent mutations.
///
/// # Thread safety
///
/// The store is `Send + Sync` and is shared across request handlers
/// behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<UserId, User>,
    ends: HashMap<EndId, End>,
    boxes: HashMap<ObjectId, GrowBox>,
    plants: HashMap<ObjectId, Plant>,
    timelapses: HashMap<ObjectId, Timelapse>,
    devices: HashMap<ObjectId, Device>,
    feeds: HashMap<ObjectId, Feed>,
    feedentries: HashMap<ObjectId, FeedEntry>,
    feedmedias: HashMap<ObjectId, FeedMedia>,
    shadows: HashMap<(Collection, EndId, ObjectId), ShadowRow>,
}

impl MemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of shadow rows across all collections. Test helper.
    #[must_use]
    pub fn shadow_count(&self) -> usize {
        self.inner.read().shadows.len()
    }
}

/// Normalizes a nickname for uniqueness/login lookups: lowercased,
/// spaces removed.
fn normalize_handle(nickname: &str) -> String {
    nickname
        .chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_lowercase()
}

macro_rules! impl_entity_store {
    ($entity:ty, $table:ident) => {
        impl EntityStore<$entity> for MemoryStore {
            fn get(&self, id: ObjectId) -> StoreResult<Option<$entity>> {
                Ok(self.inner.read().$table.get(&id).cloned())
            }

            fn insert(&self, entity: &$entity) -> StoreResult<ObjectId> {
                let id = ObjectId::random();
                let mut row = entity.clone();
                row.set_id(id);
                self.inner.write().$table.insert(id, row);
                Ok(id)
            }

            fn update(&self, entity: &$entity) -> StoreResult<()> {
                let id = entity
                    .id()
                    .ok_or_else(|| StoreError::backend("update without primary key"))?;
                let mut inner = self.inner.write();
                match inner.$table.get_mut(&id) {
                    Some(slot) => {
                        *slot = entity.clone();
                        Ok(())
                    }
                    None => Err(StoreError::not_found(<$entity>::COLLECTION, id)),
                }
            }

            fn list_owned(&self, user_id: UserId) -> StoreResult<Vec<$entity>> {
                let inner = self.inner.read();
                let mut rows: Vec<$entity> = inner
                    .$table
                    .values()
                    .filter(|e| e.owner() == Some(user_id))
                    .cloned()
                    .collect();
                rows.sort_by_key(|e| (e.created_at(), e.id()));
                Ok(rows)
            }
        }
    };
}

impl_entity_store!(GrowBox, boxes);
impl_entity_store!(Plant, plants);
impl_entity_store!(Timelapse, timelapses);
impl_entity_store!(Device, devices);
impl_entity_store!(Feed, feeds);
impl_entity_store!(FeedEntry, feedentries);
impl_entity_store!(FeedMedia, feedmedias);

impl EndStore for MemoryStore {
    fn insert_end(&self, end: &End) -> StoreResult<EndId> {
        let id = EndId::random();
        let mut row = end.clone();
        row.id = Some(id);
        self.inner.write().ends.insert(id, row);
        Ok(id)
    }

    fn get_end(&self, id: EndId) -> StoreResult<Option<End>> {
        Ok(self.inner.read().ends.get(&id).cloned())
    }

    fn ends_for_user(&self, user_id: UserId) -> StoreResult<Vec<End>> {
        let inner = self.inner.read();
        let mut ends: Vec<End> = inner
            .ends
            .values()
            .filter(|e| e.user_id == Some(user_id))
            .cloned()
            .collect();
        ends.sort_by_key(|e| (e.cat, e.id));
        Ok(ends)
    }
}

impl UserStore for MemoryStore {
    fn insert_user(&self, user: &User) -> StoreResult<UserId> {
        let handle = normalize_handle(&user.nickname);
        let mut inner = self.inner.write();
        if inner
            .users
            .values()
            .any(|u| normalize_handle(&u.nickname) == handle)
        {
            return Err(StoreError::Conflict(format!(
                "user already exists: {}",
                user.nickname
            )));
        }
        let id = UserId::random();
        let mut row = user.clone();
        row.id = Some(id);
        inner.users.insert(id, row);
        Ok(id)
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.inner.read().users.get(&id).cloned())
    }

    fn user_by_handle(&self, handle: &str) -> StoreResult<Option<User>> {
        let handle = normalize_handle(handle);
        let inner = self.inner.read();
        Ok(inner
            .users
            .values()
            .find(|u| normalize_handle(&u.nickname) == handle)
            .cloned())
    }
}

impl ShadowStore for MemoryStore {
    fn insert_shadow(&self, collection: Collection, row: ShadowRow) -> StoreResult<()> {
        self.inner
            .write()
            .shadows
            .insert((collection, row.end_id, row.object_id), row);
        Ok(())
    }

    fn shadow(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<Option<ShadowRow>> {
        Ok(self
            .inner
            .read()
            .shadows
            .get(&(collection, end_id, object_id))
            .copied())
    }

    fn dirty_objects_for_end(
        &self,
        collection: Collection,
        end_id: EndId,
    ) -> StoreResult<Vec<ObjectId>> {
        let inner = self.inner.read();
        Ok(inner
            .shadows
            .iter()
            .filter(|((c, e, _), row)| *c == collection && *e == end_id && row.dirty)
            .map(|((_, _, o), _)| *o)
            .collect())
    }

    fn mark_dirty_except(
        &self,
        collection: Collection,
        object_id: ObjectId,
        originator: EndId,
        owner: UserId,
    ) -> StoreResult<u64> {
        // One statement under one write lock: the in-memory equivalent of
        // "update ... set dirty = true where <fk> = ? and userendid != ?
        //  and userendid in (select id from userends where userid = ?)".
        let mut inner = self.inner.write();
        let owned_ends: Vec<EndId> = inner
            .ends
            .values()
            .filter(|e| e.user_id == Some(owner))
            .filter_map(|e| e.id)
            .collect();
        let mut touched = 0;
        for ((c, e, o), row) in inner.shadows.iter_mut() {
            if *c == collection && *o == object_id && *e != originator && owned_ends.contains(e) {
                row.dirty = true;
                touched += 1;
            }
        }
        Ok(touched)
    }

    fn clear_dirty(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<()> {
        let mut inner = self.inner.write();
        match inner.shadows.get_mut(&(collection, end_id, object_id)) {
            Some(row) => {
                row.dirty = false;
                row.sent = true;
                Ok(())
            }
            None => Err(StoreError::not_found(collection, object_id)),
        }
    }

    fn delete_shadow(
        &self,
        collection: Collection,
        end_id: EndId,
        object_id: ObjectId,
    ) -> StoreResult<()> {
        self.inner
            .write()
            .shadows
            .remove(&(collection, end_id, object_id));
        Ok(())
    }

    fn delete_shadows_for_end(
        &self,
        collection: Collection,
        object_ids: &[ObjectId],
        end_id: EndId,
    ) -> StoreResult<u64> {
        let mut inner = self.inner.write();
        let before = inner.shadows.len();
        inner
            .shadows
            .retain(|(c, e, o), _| !(*c == collection && *e == end_id && object_ids.contains(o)));
        Ok((before - inner.shadows.len()) as u64)
    }
}

impl DiaryIndex for MemoryStore {
    fn owner_of(&self, collection: Collection, id: ObjectId) -> StoreResult<Option<UserId>> {
        let inner = self.inner.read();
        Ok(match collection {
            Collection::Boxes => inner.boxes.get(&id).and_then(OwnedObject::owner),
            Collection::Plants => inner.plants.get(&id).and_then(OwnedObject::owner),
            Collection::Timelapses => inner.timelapses.get(&id).and_then(OwnedObject::owner),
            Collection::Devices => inner.devices.get(&id).and_then(OwnedObject::owner),
            Collection::Feeds => inner.feeds.get(&id).and_then(OwnedObject::owner),
            Collection::FeedEntries => inner.feedentries.get(&id).and_then(OwnedObject::owner),
            Collection::FeedMedias => inner.feedmedias.get(&id).and_then(OwnedObject::owner),
        })
    }

    fn lifecycle_of(
        &self,
        collection: Collection,
        id: ObjectId,
    ) -> StoreResult<Option<Lifecycle>> {
        fn lifecycle<E: Syncable>(e: &E) -> Lifecycle {
            Lifecycle {
                deleted: e.deleted(),
                archived: e.archived(),
            }
        }

        let inner = self.inner.read();
        Ok(match collection {
            Collection::Boxes => inner.boxes.get(&id).map(lifecycle),
            Collection::Plants => inner.plants.get(&id).map(lifecycle),
            Collection::Timelapses => inner.timelapses.get(&id).map(lifecycle),
            Collection::Devices => inner.devices.get(&id).map(lifecycle),
            Collection::Feeds => inner.feeds.get(&id).map(lifecycle),
            Collection::FeedEntries => inner.feedentries.get(&id).map(lifecycle),
            Collection::FeedMedias => inner.feedmedias.get(&id).map(lifecycle),
        })
    }

    fn aggregate_archived(&self, collection: Collection, id: ObjectId) -> StoreResult<bool> {
        let inner = self.inner.read();
        let plant_archived =
            |plant_id: &ObjectId| inner.plants.get(plant_id).is_some_and(|p| p.archived);
        let feed_plant_archived = |feed_id: &ObjectId| {
            inner
                .plants
                .values()
                .any(|p| p.feed_id == *feed_id && p.archived)
        };

        Ok(match collection {
            Collection::Boxes | Collection::Devices => false,
            Collection::Plants => inner.plants.get(&id).is_some_and(|p| p.archived),
            Collection::Timelapses => inner
                .timelapses
                .get(&id)
                .is_some_and(|t| plant_archived(&t.plant_id)),
            Collection::Feeds => feed_plant_archived(&id),
            Collection::FeedEntries => inner
                .feedentries
                .get(&id)
                .is_some_and(|e| feed_plant_archived(&e.feed_id)),
            Collection::FeedMedias => inner.feedmedias.get(&id).is_some_and(|m| {
                inner
                    .feedentries
                    .get(&m.feed_entry_id)
                    .is_some_and(|e| feed_plant_archived(&e.feed_id))
            }),
        })
    }

    fn timelapse_ids_of_plant(&self, plant_id: ObjectId) -> StoreResult<Vec<ObjectId>> {
        let inner = self.inner.read();
        Ok(inner
            .timelapses
            .values()
            .filter(|t| t.plant_id == plant_id)
            .filter_map(|t| t.id)
            .collect())
    }

    fn entry_ids_of_feed(&self, feed_id: ObjectId) -> StoreResult<Vec<ObjectId>> {
        let inner = self.inner.read();
        Ok(inner
            .feedentries
            .values()
            .filter(|e| e.feed_id == feed_id)
            .filter_map(|e| e.id)
            .collect())
    }

    fn media_ids_of_entries(&self, entry_ids: &[ObjectId]) -> StoreResult<Vec<ObjectId>> {
        let inner = self.inner.read();
        Ok(inner
            .feedmedias
            .values()
            .filter(|m| entry_ids.contains(&m.feed_entry_id))
            .filter_map(|m| m.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feed(user: UserId) -> Feed {
        Feed {
            id: None,
            user_id: Some(user),
            name: "feed".into(),
            deleted: false,
            cat: 1,
            uat: 1,
        }
    }

    fn end(user: UserId) -> End {
        End {
            id: None,
            user_id: Some(user),
            name: "phone".into(),
            cat: 1,
            uat: 1,
        }
    }

    #[test]
    fn insert_mints_primary_key() {
        let store = MemoryStore::new();
        let user = UserId::random();
        let id = EntityStore::<Feed>::insert(&store, &feed(user)).unwrap();
        let fetched: Feed = store.get(id).unwrap().unwrap();
        assert_eq!(fetched.id, Some(id));
    }

    #[test]
    fn update_is_full_row_replace() {
        let store = MemoryStore::new();
        let user = UserId::random();
        let id = EntityStore::<Feed>::insert(&store, &feed(user)).unwrap();

        let mut replacement = feed(user);
        replacement.id = Some(id);
        replacement.name = "renamed".into();
        EntityStore::<Feed>::update(&store, &replacement).unwrap();

        let fetched: Feed = store.get(id).unwrap().unwrap();
        assert_eq!(fetched.name, "renamed");
    }

    #[test]
    fn update_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let mut row = feed(UserId::random());
        row.id = Some(ObjectId::random());
        let err = EntityStore::<Feed>::update(&store, &row).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn duplicate_handles_conflict_case_insensitively() {
        let store = MemoryStore::new();
        let a = User {
            id: None,
            nickname: "Grow Er".into(),
            password: "x".into(),
            cat: 0,
            uat: 0,
        };
        store.insert_user(&a).unwrap();

        let mut b = a.clone();
        b.nickname = "grower".into();
        assert!(matches!(
            store.insert_user(&b),
            Err(StoreError::Conflict(_))
        ));
    }

    #[test]
    fn mark_dirty_except_skips_originator_and_foreign_ends() {
        let store = MemoryStore::new();
        let user = UserId::random();
        let stranger = UserId::random();
        let mine = store.insert_end(&end(user)).unwrap();
        let other = store.insert_end(&end(user)).unwrap();
        let theirs = store.insert_end(&end(stranger)).unwrap();

        let object = ObjectId::random();
        for e in [mine, other, theirs] {
            store
                .insert_shadow(Collection::Feeds, ShadowRow::pending(e, object))
                .unwrap();
        }
        store.clear_dirty(Collection::Feeds, mine, object).unwrap();
        store.clear_dirty(Collection::Feeds, other, object).unwrap();
        store
            .clear_dirty(Collection::Feeds, theirs, object)
            .unwrap();

        let touched = store
            .mark_dirty_except(Collection::Feeds, object, mine, user)
            .unwrap();
        assert_eq!(touched, 1);
        assert!(!store.shadow(Collection::Feeds, mine, object).unwrap().unwrap().dirty);
        assert!(store.shadow(Collection::Feeds, other, object).unwrap().unwrap().dirty);
        assert!(!store.shadow(Collection::Feeds, theirs, object).unwrap().unwrap().dirty);
    }

    #[test]
    fn delete_shadows_for_end_only_hits_named_objects() {
        let store = MemoryStore::new();
        let e = EndId::random();
        let keep = ObjectId::random();
        let drop = ObjectId::random();
        store
            .insert_shadow(Collection::Plants, ShadowRow::pending(e, keep))
            .unwrap();
        store
            .insert_shadow(Collection::Plants, ShadowRow::pending(e, drop))
            .unwrap();

        let removed = store
            .delete_shadows_for_end(Collection::Plants, &[drop], e)
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.shadow(Collection::Plants, e, keep).unwrap().is_some());
        assert!(store.shadow(Collection::Plants, e, drop).unwrap().is_none());
    }

    proptest! {
        #[test]
        fn dirty_marking_never_touches_the_originator(n_peers in 0usize..8) {
            let store = MemoryStore::new();
            let user = UserId::random();
            let originator = store.insert_end(&end(user)).unwrap();
            let peers: Vec<EndId> = (0..n_peers)
                .map(|_| store.insert_end(&end(user)).unwrap())
                .collect();

            let object = ObjectId::random();
            store
                .insert_shadow(Collection::Plants, ShadowRow::originator(originator, object))
                .unwrap();
            for p in &peers {
                store
                    .insert_shadow(Collection::Plants, ShadowRow::pending(*p, object))
                    .unwrap();
            }

            let touched = store
                .mark_dirty_except(Collection::Plants, object, originator, user)
                .unwrap();
            prop_assert_eq!(touched as usize, n_peers);

            let row = store
                .shadow(Collection::Plants, originator, object)
                .unwrap()
                .unwrap();
            prop_assert!(!row.dirty);
            prop_assert!(row.sent);
        }
    }
}
