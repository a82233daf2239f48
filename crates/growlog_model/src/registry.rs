//! The collection registry.
//!
//! Every syncable entity kind is registered here. The registry maps a
//! collection to its wire name, its shadow table name, and the foreign-key
//! column shadow rows use to point back at the tracked object. Adding a
//! new syncable kind means adding a variant here and an entity struct
//! implementing [`crate::Syncable`]; nothing else in the sync core changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A registered syncable collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Grow boxes.
    Boxes,
    /// Plants: the cascade aggregate, the only kind with an archive flag.
    Plants,
    /// Plant timelapses.
    Timelapses,
    /// Controller devices.
    Devices,
    /// Diary feeds.
    Feeds,
    /// Diary feed entries.
    #[serde(rename = "feedentries")]
    FeedEntries,
    /// Feed entry media attachments.
    #[serde(rename = "feedmedias")]
    FeedMedias,
}

impl Collection {
    /// All registered collections, in the fixed top-down cascade order
    /// (aggregate first, leaves last).
    pub const ALL: [Collection; 7] = [
        Collection::Boxes,
        Collection::Plants,
        Collection::Timelapses,
        Collection::Devices,
        Collection::Feeds,
        Collection::FeedEntries,
        Collection::FeedMedias,
    ];

    /// The collection's table/wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Boxes => "boxes",
            Collection::Plants => "plants",
            Collection::Timelapses => "timelapses",
            Collection::Devices => "devices",
            Collection::Feeds => "feeds",
            Collection::FeedEntries => "feedentries",
            Collection::FeedMedias => "feedmedias",
        }
    }

    /// The shadow table tracking per-end sync state for this collection.
    #[must_use]
    pub const fn shadow_table(self) -> &'static str {
        match self {
            Collection::Boxes => "userend_boxes",
            Collection::Plants => "userend_plants",
            Collection::Timelapses => "userend_timelapses",
            Collection::Devices => "userend_devices",
            Collection::Feeds => "userend_feeds",
            Collection::FeedEntries => "userend_feedentries",
            Collection::FeedMedias => "userend_feedmedias",
        }
    }

    /// The foreign-key column of the shadow table.
    #[must_use]
    pub const fn shadow_fk(self) -> &'static str {
        match self {
            Collection::Boxes => "boxid",
            Collection::Plants => "plantid",
            Collection::Timelapses => "timelapseid",
            Collection::Devices => "deviceid",
            Collection::Feeds => "feedid",
            Collection::FeedEntries => "feedentryid",
            Collection::FeedMedias => "feedmediaid",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown collection name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection: {0}")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}
