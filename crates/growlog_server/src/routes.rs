//! The route table.
//!
//! Dispatch is transport-agnostic: callers hand in the method, path,
//! bearer token, and raw body, and get back a status plus JSON body.
//! An HTTP front end, the CLI demo, and the integration tests all drive
//! the same function.

use crate::error::ServerError;
use crate::handlers::DiaryService;
use crate::response::Response;
use growlog_model::{Device, Feed, FeedEntry, FeedMedia, GrowBox, Plant, Timelapse};
use growlog_store::Store;

/// Dispatches one request and maps errors to wire responses.
pub fn handle<S: Store + 'static>(
    service: &DiaryService<S>,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: &[u8],
) -> Response {
    match route(service, method, path, token, body) {
        Ok(resp) => resp,
        Err(err) => {
            if err.status() >= 500 {
                tracing::error!(method, path, error = %err, "request failed");
            } else {
                tracing::debug!(method, path, error = %err, "request rejected");
            }
            Response::error(&err)
        }
    }
}

fn route<S: Store + 'static>(
    service: &DiaryService<S>,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: &[u8],
) -> Result<Response, ServerError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match (method, segments.as_slice()) {
        ("POST", ["user"]) => service.create_user(body),
        ("POST", ["login"]) => service.login(body),
        ("POST", ["userend"]) => service.register_end(token, body),

        ("POST", ["box"]) => service.insert::<GrowBox>(token, body),
        ("PUT", ["box"]) => service.update::<GrowBox>(token, body),
        ("POST", ["plant"]) => service.insert::<Plant>(token, body),
        ("PUT", ["plant"]) => service.update::<Plant>(token, body),
        ("POST", ["timelapse"]) => service.insert::<Timelapse>(token, body),
        ("PUT", ["timelapse"]) => service.update::<Timelapse>(token, body),
        ("POST", ["device"]) => service.insert::<Device>(token, body),
        ("PUT", ["device"]) => service.update::<Device>(token, body),
        ("POST", ["feed"]) => service.insert::<Feed>(token, body),
        ("PUT", ["feed"]) => service.update::<Feed>(token, body),
        ("POST", ["feedEntry"]) => service.insert::<FeedEntry>(token, body),
        ("PUT", ["feedEntry"]) => service.update::<FeedEntry>(token, body),
        ("POST", ["feedMedia"]) => service.insert::<FeedMedia>(token, body),
        ("PUT", ["feedMedia"]) => service.update::<FeedMedia>(token, body),

        ("GET", ["syncBoxes"]) => service.pull::<GrowBox>(token),
        ("GET", ["syncPlants"]) => service.pull::<Plant>(token),
        ("GET", ["syncTimelapses"]) => service.pull::<Timelapse>(token),
        ("GET", ["syncDevices"]) => service.pull::<Device>(token),
        ("GET", ["syncFeeds"]) => service.pull::<Feed>(token),
        ("GET", ["syncFeedEntries"]) => service.pull::<FeedEntry>(token),
        ("GET", ["syncFeedMedias"]) => service.pull::<FeedMedia>(token),

        ("POST", ["box", id, "sync"]) => service.ack::<GrowBox>(token, id),
        ("POST", ["plant", id, "sync"]) => service.ack::<Plant>(token, id),
        ("POST", ["timelapse", id, "sync"]) => service.ack::<Timelapse>(token, id),
        ("POST", ["device", id, "sync"]) => service.ack::<Device>(token, id),
        ("POST", ["feed", id, "sync"]) => service.ack::<Feed>(token, id),
        ("POST", ["feedEntry", id, "sync"]) => service.ack::<FeedEntry>(token, id),
        ("POST", ["feedMedia", id, "sync"]) => service.ack::<FeedMedia>(token, id),

        ("POST", ["plant", id, "archive"]) => service.archive(token, id),
        ("POST", ["deletes"]) => service.deletes(token, body),

        _ => Err(ServerError::UnknownRoute),
    }
}
