//! Shared test fixtures and instrumented store doubles.
//!
//! Lives in its own crate so every growlog crate's tests can seed the
//! same diary shapes without copy-pasting setup code.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod fixtures;
mod recording;

pub use fixtures::DiaryFixture;
pub use recording::RecordingStore;
