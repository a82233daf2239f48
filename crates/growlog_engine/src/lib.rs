//! Sync core for the growlog diary backend.
//!
//! The engine turns authenticated mutations into per-end shadow-row
//! bookkeeping:
//!
//! - inserts fan one shadow row out to every end of the owning user,
//! - updates dirty every peer end's row in one atomic statement,
//! - pulls return an end's dirty backlog and stay idempotent until the
//!   client acknowledges each record,
//! - archiving a plant retires its whole subtree from sync tracking.
//!
//! Mutations run through a staged [`pipeline`]; all storage access goes
//! through the [`growlog_store::Store`] traits, so the engine never
//! cares which backend is underneath.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod access;
mod archive;
mod config;
mod deletes;
mod ends;
#[allow(clippy::module_inception)]
mod engine;
mod error;
pub mod pipeline;
mod sync;

pub use access::Actor;
pub use archive::archive_plant;
pub use config::EngineConfig;
pub use deletes::{apply_deletes, DeleteItem, DeleteOutcome};
pub use ends::register_end;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use sync::{acknowledge, backlog};
