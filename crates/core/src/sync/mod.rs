//! Offline queue, flush orchestration and connectivity handling.

mod connectivity;
mod mutation_queue;
mod sync_model;
mod sync_orchestrator;
mod sync_scheduler;
mod sync_state;

pub use connectivity::*;
pub use mutation_queue::MutationQueue;
pub use sync_model::*;
pub use sync_orchestrator::*;
pub use sync_scheduler::*;
pub use sync_state::SyncStateStore;
