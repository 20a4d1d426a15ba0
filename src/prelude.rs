// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use recsync::prelude::*;` to get started quickly.

pub use crate::config::SyncConfig;
pub use crate::cutoff::{
    ConsensusCoordinator, CutoffOverride, CutoffSource, CutoffState, Disagreement, HttpPeerClient,
    Peer, PeerClient, PeerDirectory, Reconciliation, StaticPeers, UNSET_SENTINEL,
};
pub use crate::error::{ConfigError, FetchError, PeerError, SyncError, TimeError};
pub use crate::records::{Order, OrderItem, TrainingSet, filter};
pub use crate::server::{router, serve};
pub use crate::sync::{HttpRecordSource, RecordSource, SyncDriver, Trainer};
