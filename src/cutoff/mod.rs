// ABOUTME: Cutoff module - the agreed training cutoff and how peers agree on it.
// ABOUTME: Contains the shared state, peer seams, and the consensus coordinator.

mod coordinator;
mod peer;
mod state;

pub use coordinator::*;
pub use peer::*;
pub use state::*;
