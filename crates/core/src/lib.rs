//! Offline-first record editing and sync for field QA projects.
//!
//! Edits land in a local tabular file first. When the remote copy cannot be
//! updated right away they wait in a durable queue that the
//! [`sync::SyncOrchestrator`] drains once the network is back.

pub mod clock;
pub mod errors;
pub mod projects;
pub mod records;
pub mod store;
pub mod submission;
pub mod sync;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{Error, Result};
