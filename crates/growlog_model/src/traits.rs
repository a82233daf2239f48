//! Capability traits implemented by syncable entities.
//!
//! Each entity implements a static capability interface, so the mutation
//! pipeline's requirements (ownership, parent references, lifecycle
//! flags) are checked at compile time instead of being located by field
//! name at runtime.

use crate::ids::{ObjectId, UserId};
use crate::registry::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A persistable record with a primary key and timestamps.
pub trait Object {
    /// The record's primary key, if already persisted (or supplied by the
    /// client on update).
    fn id(&self) -> Option<ObjectId>;

    /// Sets the primary key after insertion.
    fn set_id(&mut self, id: ObjectId);

    /// Creation timestamp, unix milliseconds.
    fn created_at(&self) -> u64;

    /// Stamps timestamps: sets `uat` to `now_ms` always, and `cat` too if
    /// the record has never been stamped.
    fn stamp(&mut self, now_ms: u64);
}

/// A record owned by exactly one user.
pub trait OwnedObject: Object {
    /// The owning user, once stamped.
    fn owner(&self) -> Option<UserId>;

    /// Stamps the owning user. Mutations always overwrite whatever the
    /// client sent; ownership is never client-controlled.
    fn set_owner(&mut self, user_id: UserId);
}

/// The declared parent reference of an entity, resolved statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// The entity has no parent record.
    None,
    /// The parent reference is mandatory.
    Required {
        /// Collection the parent lives in.
        collection: Collection,
        /// The referenced parent.
        id: ObjectId,
    },
    /// The parent reference may be unset.
    Optional {
        /// Collection the parent lives in.
        collection: Collection,
        /// The referenced parent, when set.
        id: Option<ObjectId>,
    },
}

/// A record tracked by the sync subsystem.
///
/// Everything the mutation pipeline, fan-out, dirtying and cascade engines
/// need from an entity is expressed here; no runtime field lookup.
pub trait Syncable:
    OwnedObject + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The collection this entity kind is registered under.
    const COLLECTION: Collection;

    /// The entity's declared parent reference.
    fn parent(&self) -> ParentLink;

    /// Soft-delete flag.
    fn deleted(&self) -> bool;

    /// Sets the soft-delete flag. Deletion is an ordinary update and
    /// propagates through the same dirty path as any other change.
    fn set_deleted(&mut self, deleted: bool);

    /// Archive flag. Only the cascade aggregate (plants) carries one;
    /// every other kind reports false.
    fn archived(&self) -> bool {
        false
    }
}
