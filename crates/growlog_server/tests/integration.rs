//! Full request-level scenario: two devices of one account register,
//! build a diary, and converge through pull/ack.

use growlog_engine::Engine;
use growlog_server::{handle, DiaryService, Response, TokenSigner};
use growlog_store::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;

fn service() -> DiaryService<MemoryStore> {
    let engine = Engine::new(Arc::new(MemoryStore::new()));
    DiaryService::new(engine, TokenSigner::new(b"integration secret".to_vec()))
}

fn post(svc: &DiaryService<MemoryStore>, path: &str, token: Option<&str>, body: Value) -> Response {
    handle(svc, "POST", path, token, body.to_string().as_bytes())
}

fn get(svc: &DiaryService<MemoryStore>, path: &str, token: Option<&str>) -> Response {
    handle(svc, "GET", path, token, b"")
}

fn put(svc: &DiaryService<MemoryStore>, path: &str, token: Option<&str>, body: Value) -> Response {
    handle(svc, "PUT", path, token, body.to_string().as_bytes())
}

/// Registers a user and two ends, returning the two end tokens.
fn two_ends(svc: &DiaryService<MemoryStore>) -> (String, String) {
    let resp = post(
        svc,
        "/user",
        None,
        json!({"nickname": "grower one", "password": "hunter22"}),
    );
    assert_eq!(resp.status, 201, "{:?}", resp.body);

    let resp = post(
        svc,
        "/login",
        None,
        json!({"nickname": "Grower One", "password": "hunter22"}),
    );
    assert_eq!(resp.status, 200);
    let login_token = resp.body["token"].as_str().unwrap().to_string();

    let register = |name: &str| {
        let resp = post(
            svc,
            "/userend",
            Some(&login_token),
            json!({"name": name}),
        );
        assert_eq!(resp.status, 201);
        resp.body["token"].as_str().unwrap().to_string()
    };
    (register("phone"), register("tablet"))
}

#[test]
fn register_login_and_sync_a_plant() {
    let svc = service();
    let (phone, tablet) = two_ends(&svc);

    let resp = post(&svc, "/box", Some(&phone), json!({"name": "tent"}));
    assert_eq!(resp.status, 201);
    let box_id = resp.body["id"].as_str().unwrap().to_string();

    let resp = post(&svc, "/feed", Some(&phone), json!({"name": "diary"}));
    let feed_id = resp.body["id"].as_str().unwrap().to_string();

    let resp = post(
        &svc,
        "/plant",
        Some(&phone),
        json!({"boxID": box_id, "feedID": feed_id, "name": "northern lights"}),
    );
    assert_eq!(resp.status, 201);
    let plant_id = resp.body["id"].as_str().unwrap().to_string();

    // The tablet sees the plant; the phone does not.
    let resp = get(&svc, "/syncPlants", Some(&tablet));
    assert_eq!(resp.status, 200);
    let items = resp.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "northern lights");
    assert!(get(&svc, "/syncPlants", Some(&phone)).body["items"]
        .as_array()
        .unwrap()
        .is_empty());

    // Acknowledge and the backlog drains; pulls before that repeat.
    let mut pulled = items[0].clone();
    let resp = post(&svc, &format!("/plant/{plant_id}/sync"), Some(&tablet), json!({}));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["status"], "OK");
    assert!(get(&svc, "/syncPlants", Some(&tablet)).body["items"]
        .as_array()
        .unwrap()
        .is_empty());

    // The phone renames the plant; the tablet owes another pull.
    pulled["name"] = json!("renamed");
    let resp = put(&svc, "/plant", Some(&phone), pulled);
    assert_eq!(resp.status, 200);
    let items = get(&svc, "/syncPlants", Some(&tablet)).body["items"].clone();
    assert_eq!(items.as_array().unwrap()[0]["name"], "renamed");
}

#[test]
fn archive_retires_the_subtree_for_peers() {
    let svc = service();
    let (phone, tablet) = two_ends(&svc);

    let box_id = post(&svc, "/box", Some(&phone), json!({"name": "tent"})).body["id"]
        .as_str()
        .unwrap()
        .to_string();
    let feed_id = post(&svc, "/feed", Some(&phone), json!({"name": "diary"})).body["id"]
        .as_str()
        .unwrap()
        .to_string();
    let plant_id = post(
        &svc,
        "/plant",
        Some(&phone),
        json!({"boxID": box_id, "feedID": feed_id, "name": "kush"}),
    )
    .body["id"]
        .as_str()
        .unwrap()
        .to_string();
    let resp = post(
        &svc,
        "/feedEntry",
        Some(&phone),
        json!({"feedID": feed_id, "type": "FE_WATER", "date": 100}),
    );
    assert_eq!(resp.status, 201);

    let resp = post(&svc, &format!("/plant/{plant_id}/archive"), Some(&phone), json!({}));
    assert_eq!(resp.status, 200);

    // The phone's own backlog stays empty; the tablet pulls the
    // archived plant and further inserts under it are rejected.
    assert!(get(&svc, "/syncPlants", Some(&phone)).body["items"]
        .as_array()
        .unwrap()
        .is_empty());
    let items = get(&svc, "/syncPlants", Some(&tablet)).body["items"].clone();
    assert_eq!(items.as_array().unwrap()[0]["archived"], json!(true));

    let resp = post(
        &svc,
        "/feedEntry",
        Some(&phone),
        json!({"feedID": feed_id, "type": "FE_NOTE", "date": 101}),
    );
    assert_eq!(resp.status, 400);
}

#[test]
fn deletes_tombstone_for_peers() {
    let svc = service();
    let (phone, tablet) = two_ends(&svc);

    let feed_id = post(&svc, "/feed", Some(&phone), json!({"name": "doomed"})).body["id"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = post(
        &svc,
        "/deletes",
        Some(&phone),
        json!({"deletes": [{"id": feed_id, "type": "feeds"}]}),
    );
    assert_eq!(resp.status, 200);

    let items = get(&svc, "/syncFeeds", Some(&tablet)).body["items"].clone();
    assert_eq!(items.as_array().unwrap()[0]["deleted"], json!(true));
}

#[test]
fn auth_and_validation_failures_map_to_statuses() {
    let svc = service();
    let (phone, _) = two_ends(&svc);

    // No token, garbage token, user-only token.
    assert_eq!(get(&svc, "/syncPlants", None).status, 401);
    assert_eq!(get(&svc, "/syncPlants", Some("beef")).status, 401);

    // Wrong password.
    let resp = post(
        &svc,
        "/login",
        None,
        json!({"nickname": "grower one", "password": "wrong"}),
    );
    assert_eq!(resp.status, 401);

    // Update without an ID.
    let resp = put(&svc, "/feed", Some(&phone), json!({"name": "x"}));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["error"], "Missing object's ID");

    // Empty body, unknown field, unknown route.
    let resp = handle(&svc, "POST", "/feed", Some(&phone), b"");
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["error"], "Request body must not be empty");
    let resp = post(&svc, "/feed", Some(&phone), json!({"name": "x", "bogus": 1}));
    assert_eq!(resp.status, 400);
    assert_eq!(handle(&svc, "GET", "/nope", None, b"").status, 404);

    // Short nicknames are rejected.
    let resp = post(&svc, "/user", None, json!({"nickname": "ab", "password": "x"}));
    assert_eq!(resp.status, 400);

    // Duplicate nicknames conflict.
    let resp = post(
        &svc,
        "/user",
        None,
        json!({"nickname": "GROWER ONE", "password": "x"}),
    );
    assert_eq!(resp.status, 400);
}

#[test]
fn a_user_only_token_cannot_sync() {
    let svc = service();
    post(
        &svc,
        "/user",
        None,
        json!({"nickname": "grower two", "password": "pw"}),
    );
    let login = post(
        &svc,
        "/login",
        None,
        json!({"nickname": "grower two", "password": "pw"}),
    );
    let token = login.body["token"].as_str().unwrap();

    let resp = get(&svc, "/syncPlants", Some(token));
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["error"], "Missing userEndID");
}
