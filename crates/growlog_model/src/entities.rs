//! The diary entity structs.
//!
//! JSON field names follow the mobile app's wire format (`userID`,
//! `boxID`, `cat`/`uat` unix-millisecond timestamps). Unknown fields are
//! rejected at decode time so a client typo never silently drops data.

use crate::ids::{EndId, ObjectId, UserId};
use crate::registry::Collection;
use crate::traits::{Object, OwnedObject, ParentLink, Syncable};
use serde::{Deserialize, Serialize};

/// Implements [`Object`] and [`OwnedObject`] for an entity with the
/// standard `id` / `user_id` / `cat` / `uat` fields.
macro_rules! impl_owned_object {
    ($entity:ty) => {
        impl Object for $entity {
            fn id(&self) -> Option<ObjectId> {
                self.id
            }

            fn set_id(&mut self, id: ObjectId) {
                self.id = Some(id);
            }

            fn created_at(&self) -> u64 {
                self.cat
            }

            fn stamp(&mut self, now_ms: u64) {
                if self.cat == 0 {
                    self.cat = now_ms;
                }
                self.uat = now_ms;
            }
        }

        impl OwnedObject for $entity {
            fn owner(&self) -> Option<UserId> {
                self.user_id
            }

            fn set_owner(&mut self, user_id: UserId) {
                self.user_id = Some(user_id);
            }
        }
    };
}

/// An account. Owns zero or more ends and all of their diary records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    /// Primary key.
    #[serde(default)]
    pub id: Option<UserId>,
    /// Display handle, 4–21 characters after trimming.
    pub nickname: String,
    /// Plain text on registration/login bodies, salted hash at rest.
    /// Never serialized back to clients.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

/// One client installation under a user account.
///
/// Registering an end mints the auth token carrying (user, end); every
/// sync-relevant mutation is attributed to exactly one end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct End {
    /// Primary key, minted at registration.
    #[serde(default)]
    pub id: Option<EndId>,
    /// Owning user, stamped from the token.
    #[serde(default, rename = "userID")]
    pub user_id: Option<UserId>,
    /// Human-readable device name.
    #[serde(default)]
    pub name: String,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

/// A grow box, optionally driven by a controller device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrowBox {
    /// Primary key.
    #[serde(default)]
    pub id: Option<ObjectId>,
    /// Owning user, stamped from the token.
    #[serde(default, rename = "userID")]
    pub user_id: Option<UserId>,
    /// Optional controller device driving this box.
    #[serde(default, rename = "deviceID")]
    pub device_id: Option<ObjectId>,
    /// Slot index on the controller, when attached.
    #[serde(default, rename = "deviceBox")]
    pub device_box: Option<u32>,
    /// Display name.
    pub name: String,
    /// Opaque client settings blob.
    #[serde(default)]
    pub settings: String,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

impl_owned_object!(GrowBox);

impl Syncable for GrowBox {
    const COLLECTION: Collection = Collection::Boxes;

    fn parent(&self) -> ParentLink {
        ParentLink::Optional {
            collection: Collection::Devices,
            id: self.device_id,
        }
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

/// A plant. The cascade aggregate: archiving a plant retires its whole
/// subtree (timelapses, feed, feed entries, feed media) from sync
/// tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plant {
    /// Primary key.
    #[serde(default)]
    pub id: Option<ObjectId>,
    /// Owning user, stamped from the token.
    #[serde(default, rename = "userID")]
    pub user_id: Option<UserId>,
    /// The box this plant grows in.
    #[serde(rename = "boxID")]
    pub box_id: ObjectId,
    /// The plant's diary feed.
    #[serde(rename = "feedID")]
    pub feed_id: ObjectId,
    /// Display name.
    pub name: String,
    /// Whether the plant diary is publicly visible.
    #[serde(default, rename = "public")]
    pub is_public: bool,
    /// Whether environment alerts are enabled for this plant.
    #[serde(default, rename = "alertsEnabled")]
    pub alerts_enabled: bool,
    /// Opaque client settings blob.
    #[serde(default)]
    pub settings: String,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Archive flag. Terminal: set only by the cascade endpoint.
    #[serde(default)]
    pub archived: bool,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

impl_owned_object!(Plant);

impl Syncable for Plant {
    const COLLECTION: Collection = Collection::Plants;

    fn parent(&self) -> ParentLink {
        ParentLink::Required {
            collection: Collection::Boxes,
            id: self.box_id,
        }
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    fn archived(&self) -> bool {
        self.archived
    }
}

/// A plant timelapse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timelapse {
    /// Primary key.
    #[serde(default)]
    pub id: Option<ObjectId>,
    /// Owning user, stamped from the token.
    #[serde(default, rename = "userID")]
    pub user_id: Option<UserId>,
    /// The filmed plant.
    #[serde(rename = "plantID")]
    pub plant_id: ObjectId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Timelapse kind.
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Opaque client settings blob.
    #[serde(default)]
    pub settings: String,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

impl_owned_object!(Timelapse);

impl Syncable for Timelapse {
    const COLLECTION: Collection = Collection::Timelapses;

    fn parent(&self) -> ParentLink {
        ParentLink::Required {
            collection: Collection::Plants,
            id: self.plant_id,
        }
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

/// A controller device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Device {
    /// Primary key.
    #[serde(default)]
    pub id: Option<ObjectId>,
    /// Owning user, stamped from the token.
    #[serde(default, rename = "userID")]
    pub user_id: Option<UserId>,
    /// Hardware identifier.
    pub identifier: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Last known IP address.
    #[serde(default)]
    pub ip: String,
    /// mDNS name on the local network.
    #[serde(default)]
    pub mdns: String,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

impl_owned_object!(Device);

impl Syncable for Device {
    const COLLECTION: Collection = Collection::Devices;

    fn parent(&self) -> ParentLink {
        ParentLink::None
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

/// A diary feed. Plants link to their feed through
/// [`Plant::feed_id`]; the feed itself declares no parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Feed {
    /// Primary key.
    #[serde(default)]
    pub id: Option<ObjectId>,
    /// Owning user, stamped from the token.
    #[serde(default, rename = "userID")]
    pub user_id: Option<UserId>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

impl_owned_object!(Feed);

impl Syncable for Feed {
    const COLLECTION: Collection = Collection::Feeds;

    fn parent(&self) -> ParentLink {
        ParentLink::None
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

/// One diary entry in a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedEntry {
    /// Primary key.
    #[serde(default)]
    pub id: Option<ObjectId>,
    /// Owning user, stamped from the token.
    #[serde(default, rename = "userID")]
    pub user_id: Option<UserId>,
    /// The feed this entry belongs to.
    #[serde(rename = "feedID")]
    pub feed_id: ObjectId,
    /// Entry date, unix milliseconds.
    #[serde(default)]
    pub date: u64,
    /// Entry kind (watering, note, harvest, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Opaque entry parameters blob.
    #[serde(default)]
    pub params: String,
    /// Optional server-side metadata blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

impl_owned_object!(FeedEntry);

impl Syncable for FeedEntry {
    const COLLECTION: Collection = Collection::FeedEntries;

    fn parent(&self) -> ParentLink {
        ParentLink::Required {
            collection: Collection::Feeds,
            id: self.feed_id,
        }
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}

/// A media attachment (photo/video) on a feed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedMedia {
    /// Primary key.
    #[serde(default)]
    pub id: Option<ObjectId>,
    /// Owning user, stamped from the token.
    #[serde(default, rename = "userID")]
    pub user_id: Option<UserId>,
    /// The feed entry this media is attached to.
    #[serde(rename = "feedEntryID")]
    pub feed_entry_id: ObjectId,
    /// Blob-store path of the full-size file.
    #[serde(default, rename = "filePath")]
    pub file_path: String,
    /// Blob-store path of the thumbnail.
    #[serde(default, rename = "thumbnailPath")]
    pub thumbnail_path: String,
    /// Opaque media parameters blob.
    #[serde(default)]
    pub params: String,
    /// Soft-delete flag.
    #[serde(default)]
    pub deleted: bool,
    /// Creation timestamp, unix milliseconds.
    #[serde(default)]
    pub cat: u64,
    /// Last-update timestamp, unix milliseconds.
    #[serde(default)]
    pub uat: u64,
}

impl_owned_object!(FeedMedia);

impl Syncable for FeedMedia {
    const COLLECTION: Collection = Collection::FeedMedias;

    fn parent(&self) -> ParentLink {
        ParentLink::Required {
            collection: Collection::FeedEntries,
            id: self.feed_entry_id,
        }
    }

    fn deleted(&self) -> bool {
        self.deleted
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }
}
