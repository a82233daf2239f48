//! Seeded diary fixtures.

use growlog_model::{
    Collection, End, EndId, Feed, FeedEntry, FeedMedia, GrowBox, ObjectId, Plant, ShadowRow,
    Timelapse, UserId,
};
use growlog_store::{EndStore, EntityStore, MemoryStore, ShadowStore};

/// A seeded store: one user with two ends ("phone" and "tablet") and a
/// fully synced plant subtree the phone created.
///
/// Every shadow row starts `sent = true, dirty = false`, as after both
/// ends pulled and acknowledged everything. Tests then mutate and
/// observe which rows flip.
#[derive(Debug)]
pub struct DiaryFixture {
    /// The seeded store.
    pub store: MemoryStore,
    /// The owning user.
    pub user: UserId,
    /// The end that created the diary.
    pub phone: EndId,
    /// The peer end.
    pub tablet: EndId,
    /// The grow box.
    pub box_id: ObjectId,
    /// The plant growing in `box_id`.
    pub plant_id: ObjectId,
    /// The plant's diary feed.
    pub feed_id: ObjectId,
    /// A timelapse filming the plant.
    pub timelapse_id: ObjectId,
    /// A diary entry in the feed.
    pub entry_id: ObjectId,
    /// A photo attached to the entry.
    pub media_id: ObjectId,
}

impl DiaryFixture {
    /// Seeds the canonical two-end plant subtree.
    #[must_use]
    pub fn with_plant_subtree() -> Self {
        let store = MemoryStore::new();
        let user = UserId::random();

        let register = |name: &str| {
            store
                .insert_end(&End {
                    id: None,
                    user_id: Some(user),
                    name: name.into(),
                    cat: 1,
                    uat: 1,
                })
                .unwrap()
        };
        let phone = register("phone");
        let tablet = register("tablet");

        let box_id = store
            .insert(&GrowBox {
                id: None,
                user_id: Some(user),
                device_id: None,
                device_box: None,
                name: "tent".into(),
                settings: String::new(),
                deleted: false,
                cat: 10,
                uat: 10,
            })
            .unwrap();
        let feed_id = store
            .insert(&Feed {
                id: None,
                user_id: Some(user),
                name: "diary".into(),
                deleted: false,
                cat: 11,
                uat: 11,
            })
            .unwrap();
        let plant_id = store
            .insert(&Plant {
                id: None,
                user_id: Some(user),
                box_id,
                feed_id,
                name: "northern lights".into(),
                is_public: false,
                alerts_enabled: true,
                settings: String::new(),
                deleted: false,
                archived: false,
                cat: 12,
                uat: 12,
            })
            .unwrap();
        let timelapse_id = store
            .insert(&Timelapse {
                id: None,
                user_id: Some(user),
                plant_id,
                name: "growth".into(),
                kind: "dropbox".into(),
                settings: String::new(),
                deleted: false,
                cat: 13,
                uat: 13,
            })
            .unwrap();
        let entry_id = store
            .insert(&FeedEntry {
                id: None,
                user_id: Some(user),
                feed_id,
                date: 14,
                kind: "FE_WATER".into(),
                params: String::new(),
                meta: None,
                deleted: false,
                cat: 14,
                uat: 14,
            })
            .unwrap();
        let media_id = store
            .insert(&FeedMedia {
                id: None,
                user_id: Some(user),
                feed_entry_id: entry_id,
                file_path: "feedmedias/photo.jpg".into(),
                thumbnail_path: "feedmedias/photo-thumb.jpg".into(),
                params: String::new(),
                deleted: false,
                cat: 15,
                uat: 15,
            })
            .unwrap();

        let fixture = Self {
            store,
            user,
            phone,
            tablet,
            box_id,
            plant_id,
            feed_id,
            timelapse_id,
            entry_id,
            media_id,
        };
        for (collection, id) in fixture.records() {
            for end in [fixture.phone, fixture.tablet] {
                fixture
                    .store
                    .insert_shadow(collection, ShadowRow::originator(end, id))
                    .unwrap();
            }
        }
        fixture
    }

    /// Every seeded record, in cascade order: box first, then the plant
    /// subtree.
    #[must_use]
    pub fn records(&self) -> Vec<(Collection, ObjectId)> {
        let mut all = vec![(Collection::Boxes, self.box_id)];
        all.extend(self.subtree());
        all
    }

    /// The plant subtree, in cascade order.
    #[must_use]
    pub fn subtree(&self) -> Vec<(Collection, ObjectId)> {
        vec![
            (Collection::Plants, self.plant_id),
            (Collection::Timelapses, self.timelapse_id),
            (Collection::Feeds, self.feed_id),
            (Collection::FeedEntries, self.entry_id),
            (Collection::FeedMedias, self.media_id),
        ]
    }
}
