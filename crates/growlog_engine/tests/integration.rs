//! End-to-end engine scenarios over two ends of one user.

use growlog_engine::{Actor, DeleteItem, Engine, EngineConfig, EngineError};
use growlog_model::{Collection, Feed, FeedEntry, ObjectId, Plant, UserId};
use growlog_store::{EntityStore, ShadowStore};
use growlog_testkit::{DiaryFixture, RecordingStore};
use std::sync::Arc;

#[test]
fn two_ends_converge_on_an_edit() {
    let fx = DiaryFixture::with_plant_subtree();
    let phone = Actor::new(fx.user, fx.phone);
    let tablet = Actor::new(fx.user, fx.tablet);
    let engine = Engine::new(Arc::new(fx.store));

    // Phone renames the feed.
    let mut feed: Feed = engine.store().get(fx.feed_id).unwrap().unwrap();
    feed.name = "week 4".into();
    engine.update(phone, feed, 100).unwrap();

    // The phone sees nothing to pull; the tablet sees exactly the feed.
    assert!(engine.backlog::<Feed>(phone).unwrap().is_empty());
    let pulled = engine.backlog::<Feed>(tablet).unwrap();
    assert_eq!(pulled.len(), 1);
    assert_eq!(pulled[0].name, "week 4");

    // Acknowledge and the backlog drains.
    engine.acknowledge::<Feed>(tablet, fx.feed_id).unwrap();
    assert!(engine.backlog::<Feed>(tablet).unwrap().is_empty());
}

#[test]
fn insert_reaches_every_peer_but_not_the_originator() {
    let fx = DiaryFixture::with_plant_subtree();
    let phone = Actor::new(fx.user, fx.phone);
    let tablet = Actor::new(fx.user, fx.tablet);
    let engine = Engine::new(Arc::new(fx.store));

    let entry = FeedEntry {
        id: None,
        user_id: None,
        feed_id: fx.feed_id,
        date: 200,
        kind: "FE_WATER".into(),
        params: String::new(),
        meta: None,
        deleted: false,
        cat: 0,
        uat: 0,
    };
    let id = engine.insert(phone, entry, 200).unwrap();

    assert!(engine.backlog::<FeedEntry>(phone).unwrap().is_empty());
    let pulled = engine.backlog::<FeedEntry>(tablet).unwrap();
    assert!(pulled.iter().any(|e| e.id == Some(id)));
}

#[test]
fn concurrent_edits_resolve_to_the_last_write() {
    let fx = DiaryFixture::with_plant_subtree();
    let phone = Actor::new(fx.user, fx.phone);
    let tablet = Actor::new(fx.user, fx.tablet);
    let engine = Engine::new(Arc::new(fx.store));

    let base: Feed = engine.store().get(fx.feed_id).unwrap().unwrap();

    let mut from_phone = base.clone();
    from_phone.name = "phone edit".into();
    engine.update(phone, from_phone, 100).unwrap();

    let mut from_tablet = base.clone();
    from_tablet.name = "tablet edit".into();
    engine.update(tablet, from_tablet, 101).unwrap();

    let stored: Feed = engine.store().get(fx.feed_id).unwrap().unwrap();
    assert_eq!(stored.name, "tablet edit");
    assert_eq!(stored.uat, 101);

    // Both ends now owe each other a pull: each peer's row is dirty.
    assert_eq!(engine.backlog::<Feed>(phone).unwrap().len(), 1);
}

#[test]
fn a_rejected_mutation_writes_nothing() {
    let store = RecordingStore::wrap(DiaryFixture::with_plant_subtree().store);
    let engine = Engine::new(Arc::new(store));
    let stranger = Actor::new(UserId::random(), growlog_model::EndId::random());

    let entry = FeedEntry {
        id: None,
        user_id: None,
        feed_id: ObjectId::random(),
        date: 1,
        kind: "FE_NOTE".into(),
        params: String::new(),
        meta: None,
        deleted: false,
        cat: 0,
        uat: 0,
    };
    let err = engine.insert(stranger, entry, 1).unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
    assert_eq!(engine.store().writes(), 0);
}

#[test]
fn a_stranger_cannot_update_someone_elses_record() {
    let fx = DiaryFixture::with_plant_subtree();
    let feed_id = fx.feed_id;
    let engine = Engine::new(Arc::new(RecordingStore::wrap(fx.store)));
    let stranger = Actor::new(UserId::random(), growlog_model::EndId::random());

    let mut feed: Feed = engine.store().get(feed_id).unwrap().unwrap();
    feed.name = "hijacked".into();
    let err = engine.update(stranger, feed, 200).unwrap_err();
    assert!(matches!(err, EngineError::OwnershipMismatch));
    assert_eq!(engine.store().writes(), 0);

    // The record is untouched and no peer was marked dirty.
    let feed: Feed = engine.store().get(feed_id).unwrap().unwrap();
    assert_ne!(feed.name, "hijacked");
    let phone = Actor::new(fx.user, fx.phone);
    assert!(engine.backlog::<Feed>(phone).unwrap().is_empty());
}

#[test]
fn archive_then_ack_removes_tracking_everywhere() {
    let fx = DiaryFixture::with_plant_subtree();
    let phone = Actor::new(fx.user, fx.phone);
    let tablet = Actor::new(fx.user, fx.tablet);
    let engine = Engine::new(Arc::new(fx.store));

    engine.archive_plant(phone, fx.plant_id, 300).unwrap();

    // The tablet pulls the archived plant and acknowledges it; because
    // the record is archived, acknowledgment deletes the row instead of
    // clearing it.
    let pulled = engine.backlog::<Plant>(tablet).unwrap();
    assert_eq!(pulled.len(), 1);
    assert!(pulled[0].archived);
    engine.acknowledge::<Plant>(tablet, fx.plant_id).unwrap();

    assert!(engine
        .store()
        .shadow(Collection::Plants, fx.tablet, fx.plant_id)
        .unwrap()
        .is_none());

    // Inserting under the archived subtree is rejected.
    let entry = FeedEntry {
        id: None,
        user_id: None,
        feed_id: fx.feed_id,
        date: 301,
        kind: "FE_NOTE".into(),
        params: String::new(),
        meta: None,
        deleted: false,
        cat: 0,
        uat: 0,
    };
    let err = engine.insert(phone, entry, 301).unwrap_err();
    assert!(matches!(err, EngineError::Archived));
}

#[test]
fn deletes_flow_to_peers_as_tombstones() {
    let fx = DiaryFixture::with_plant_subtree();
    let phone = Actor::new(fx.user, fx.phone);
    let tablet = Actor::new(fx.user, fx.tablet);
    let engine = Engine::new(Arc::new(fx.store));

    let outcome = engine
        .apply_deletes(
            phone,
            &[DeleteItem {
                kind: "feedentries".into(),
                id: fx.entry_id,
            }],
            400,
        )
        .unwrap();
    assert_eq!(outcome.deleted, 1);

    let pulled = engine.backlog::<FeedEntry>(tablet).unwrap();
    assert_eq!(pulled.len(), 1);
    assert!(pulled[0].deleted);

    engine.acknowledge::<FeedEntry>(tablet, fx.entry_id).unwrap();
    assert!(engine
        .store()
        .shadow(Collection::FeedEntries, fx.tablet, fx.entry_id)
        .unwrap()
        .is_none());
}

#[test]
fn a_third_end_joins_and_downloads_the_diary() {
    let fx = DiaryFixture::with_plant_subtree();
    let records = fx.records();
    let engine = Engine::with_config(Arc::new(fx.store), EngineConfig::default());

    let laptop = engine.register_end(fx.user, "laptop".into(), 500).unwrap();
    let actor = Actor::new(fx.user, laptop);

    let mut pending = 0;
    pending += engine.backlog::<growlog_model::GrowBox>(actor).unwrap().len();
    pending += engine.backlog::<Plant>(actor).unwrap().len();
    pending += engine.backlog::<growlog_model::Timelapse>(actor).unwrap().len();
    pending += engine.backlog::<Feed>(actor).unwrap().len();
    pending += engine.backlog::<FeedEntry>(actor).unwrap().len();
    pending += engine.backlog::<growlog_model::FeedMedia>(actor).unwrap().len();
    assert_eq!(pending, records.len());
}
