// ABOUTME: Service settings read from RECSYNC_* environment variables.
// ABOUTME: Also wires a SyncDriver from the HTTP collaborators they name.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cutoff::{ConsensusCoordinator, CutoffOverride, CutoffState, HttpPeerClient, StaticPeers};
use crate::error::{ConfigError, SyncError};
use crate::sync::{HttpRecordSource, SyncDriver, Trainer};

pub const BIND: &str = "RECSYNC_BIND";
pub const PERSISTENCE_URL: &str = "RECSYNC_PERSISTENCE_URL";
pub const PEERS: &str = "RECSYNC_PEERS";
pub const PEER_TIMEOUT_MS: &str = "RECSYNC_PEER_TIMEOUT_MS";
pub const FETCH_TIMEOUT_MS: &str = "RECSYNC_FETCH_TIMEOUT_MS";
pub const CUTOFF: &str = "RECSYNC_CUTOFF";

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_PEER_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Settings for one recommender instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub bind: SocketAddr,
    pub persistence_url: String,
    pub peers: Vec<String>,
    pub peer_timeout: Duration,
    pub fetch_timeout: Duration,
    /// Operator pin applied before the first cycle.
    pub cutoff: Option<CutoffOverride>,
}

impl SyncConfig {
    /// Defaults for everything except the persistence service.
    pub fn new(persistence_url: impl Into<String>) -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            persistence_url: persistence_url.into(),
            peers: Vec::new(),
            peer_timeout: Duration::from_millis(DEFAULT_PEER_TIMEOUT_MS),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            cutoff: None,
        }
    }

    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let persistence_url = get(PERSISTENCE_URL).ok_or(ConfigError::Missing(PERSISTENCE_URL))?;

        let bind_text = get(BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_text
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: BIND,
                message: e.to_string(),
            })?;

        let peers = get(PEERS)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let peer_timeout = millis(get(PEER_TIMEOUT_MS), PEER_TIMEOUT_MS, DEFAULT_PEER_TIMEOUT_MS)?;
        let fetch_timeout =
            millis(get(FETCH_TIMEOUT_MS), FETCH_TIMEOUT_MS, DEFAULT_FETCH_TIMEOUT_MS)?;

        let cutoff = match get(CUTOFF) {
            Some(text) => {
                let value: CutoffOverride = text.parse().unwrap_or_else(|never| match never {});
                // Reject bad timestamps at startup rather than on the first cycle.
                value.resolve().map_err(|e| ConfigError::Invalid {
                    key: CUTOFF,
                    message: e.to_string(),
                })?;
                Some(value)
            }
            None => None,
        };

        Ok(Self {
            bind,
            persistence_url,
            peers,
            peer_timeout,
            fetch_timeout,
            cutoff,
        })
    }

    /// Wire a driver over HTTP collaborators, pinning the configured cutoff.
    pub fn build_driver(
        &self,
        state: Arc<CutoffState>,
        trainer: Arc<dyn Trainer>,
    ) -> Result<SyncDriver, SyncError> {
        if let Some(cutoff) = &self.cutoff {
            state.pin(cutoff)?;
        }

        let source = HttpRecordSource::new(&self.persistence_url, self.fetch_timeout)?;
        let client = HttpPeerClient::new(self.peer_timeout)?;
        let peers = StaticPeers::new(&self.peers);
        if peers.is_empty() {
            info!("No peers configured; the first cycle takes its cutoff from local orders");
        } else {
            info!(peers = peers.len(), "Peers configured for cutoff consensus");
        }

        let coordinator = ConsensusCoordinator::new(state, Arc::new(peers), Arc::new(client))
            .peer_timeout(self.peer_timeout);

        Ok(SyncDriver::new(Arc::new(source), coordinator, trainer))
    }
}

fn millis(value: Option<String>, key: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match value {
        Some(text) => text
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::Invalid {
                key,
                message: e.to_string(),
            }),
        None => Ok(Duration::from_millis(default)),
    }
}
