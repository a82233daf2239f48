//! # Growlog Model
//!
//! Domain model for the growlog diary backend.
//!
//! This crate provides:
//! - Identifier newtypes ([`UserId`], [`EndId`], [`ObjectId`])
//! - The syncable entity structs (grow boxes, plants, feeds, ...)
//! - Capability traits resolved at compile time ([`Object`],
//!   [`OwnedObject`], [`Syncable`])
//! - The collection registry ([`Collection`]), the single extension
//!   point for new syncable entity kinds
//! - Shadow row bookkeeping types ([`ShadowRow`])
//!
//! ## Sync model
//!
//! Every syncable record is tracked per client installation ("end") by a
//! shadow row keyed on `(end, object)`. `dirty = true` means the end has
//! not yet received the object's current state; `sent = true` is set only
//! on the originating end at creation, meaning no push is needed.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entities;
mod ids;
mod registry;
mod shadow;
mod traits;

pub use entities::{Device, End, Feed, FeedEntry, FeedMedia, GrowBox, Plant, Timelapse, User};
pub use ids::{EndId, ObjectId, UserId};
pub use registry::{Collection, UnknownCollection};
pub use shadow::ShadowRow;
pub use traits::{Object, OwnedObject, ParentLink, Syncable};
