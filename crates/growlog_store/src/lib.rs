//! # Growlog Store
//!
//! Storage service layer for the growlog diary backend.
//!
//! The sync core talks to storage through the typed traits in this crate;
//! the storage engine behind them (SQL, embedded, in-memory) is an
//! external collaborator. What the traits guarantee:
//!
//! - [`EntityStore`]: typed get/insert/update/list per entity kind;
//!   inserts mint the primary key, updates are full-row replaces.
//! - [`ShadowStore`]: per-(end, object) shadow-row bookkeeping, with
//!   the bulk conditional dirty-marking executed as one atomic statement.
//! - [`EndStore`] / [`UserStore`]: account and installation records.
//! - [`DiaryIndex`]: the subtree and ownership lookups the access gate,
//!   cascade and backfill paths issue.
//!
//! [`MemoryStore`] implements the whole surface behind a single
//! `parking_lot::RwLock`, which is what makes the bulk shadow updates
//! atomic under concurrent mutations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{DiaryIndex, EndStore, EntityStore, Lifecycle, ShadowStore, Store, UserStore};
