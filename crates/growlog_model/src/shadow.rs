//! Per-(end, object) shadow rows.

use crate::ids::{EndId, ObjectId};
use serde::{Deserialize, Serialize};

/// Sync-tracking state for one object on one end.
///
/// # Invariants
///
/// - For an object owned by a user with N registered ends there are
///   exactly N shadow rows, created atomically with the object.
/// - Exactly one row (the originator's) is `sent = true` at creation;
///   the others are `dirty = true`.
/// - `dirty = true` means the end has not received the object's current
///   state; acknowledgment flips it back to false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowRow {
    /// The end this row tracks.
    pub end_id: EndId,
    /// The tracked object.
    pub object_id: ObjectId,
    /// Whether the end still has to receive the current state.
    pub dirty: bool,
    /// Whether the originating end already holds the state as of creation.
    pub sent: bool,
}

impl ShadowRow {
    /// Row for the end that performed the creating mutation: it already
    /// holds the state, no push needed.
    #[must_use]
    pub const fn originator(end_id: EndId, object_id: ObjectId) -> Self {
        Self {
            end_id,
            object_id,
            dirty: false,
            sent: true,
        }
    }

    /// Row for any other end: it has to pull the new state.
    #[must_use]
    pub const fn pending(end_id: EndId, object_id: ObjectId) -> Self {
        Self {
            end_id,
            object_id,
            dirty: true,
            sent: false,
        }
    }
}
