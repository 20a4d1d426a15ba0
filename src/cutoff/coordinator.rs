// ABOUTME: Consensus coordinator - agrees on a training cutoff with peer instances.
// ABOUTME: Fans a query out to every peer, keeps the minimum, falls back to local data.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use futures::stream;
use tracing::{debug, info, warn};

use super::{CutoffState, Peer, PeerClient, PeerDirectory};
use crate::error::{PeerError, TimeError};
use crate::records::Order;

/// Default time a single peer gets to answer.
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of peers queried at once.
pub const DEFAULT_FAN_OUT: usize = 16;

/// A peer reported a cutoff different from the one held locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disagreement {
    pub peer: Peer,
    /// The running cutoff when the reply arrived.
    pub local: i64,
    /// What the peer reported.
    pub remote: i64,
}

/// Where the committed cutoff came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffSource {
    /// Already held before this cycle and no peer lowered it.
    Existing,
    /// At least one peer lowered or supplied it.
    Peers,
    /// Latest local order time, because nobody had one.
    Orders,
    /// Nothing known; filtering passes through.
    Unset,
}

/// Outcome of one consensus cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub cutoff: Option<i64>,
    pub source: CutoffSource,
    /// Peers that answered successfully, with or without a cutoff.
    pub replies: usize,
    pub disagreements: Vec<Disagreement>,
    pub unavailable: Vec<Peer>,
}

/// Running reduction over peer replies. Min is order independent, so replies
/// may be folded in arrival order.
struct Tally {
    cutoff: Option<i64>,
    lowered: bool,
    replies: usize,
    disagreements: Vec<Disagreement>,
    unavailable: Vec<Peer>,
}

impl Tally {
    fn new(start: Option<i64>) -> Self {
        Self {
            cutoff: start,
            lowered: false,
            replies: 0,
            disagreements: Vec::new(),
            unavailable: Vec::new(),
        }
    }

    fn observe(&mut self, peer: Peer, reply: Result<Option<i64>, PeerError>) {
        match reply {
            Ok(Some(remote)) => {
                self.replies += 1;
                if let Some(local) = self.cutoff.filter(|&local| local != remote) {
                    warn!(%peer, local, remote, "Services disagree about cutoff");
                    self.disagreements.push(Disagreement {
                        peer,
                        local,
                        remote,
                    });
                }
                if self.cutoff.is_none_or(|local| remote < local) {
                    self.cutoff = Some(remote);
                    self.lowered = true;
                }
            }
            Ok(None) => {
                self.replies += 1;
                debug!(%peer, "Peer holds no cutoff yet");
            }
            Err(error) => {
                warn!(%peer, %error, "Service was not available for time-check");
                self.unavailable.push(peer);
            }
        }
    }
}

/// Agrees on the training cutoff with every known peer.
///
/// Reduction runs on a local value; the shared [`CutoffState`] is written
/// once at the end, so a cycle dropped midway commits nothing.
pub struct ConsensusCoordinator {
    state: Arc<CutoffState>,
    directory: Arc<dyn PeerDirectory>,
    client: Arc<dyn PeerClient>,
    peer_timeout: Duration,
    fan_out: usize,
}

impl ConsensusCoordinator {
    /// Create a coordinator over the given state and peer seams.
    pub fn new(
        state: Arc<CutoffState>,
        directory: Arc<dyn PeerDirectory>,
        client: Arc<dyn PeerClient>,
    ) -> Self {
        Self {
            state,
            directory,
            client,
            peer_timeout: DEFAULT_PEER_TIMEOUT,
            fan_out: DEFAULT_FAN_OUT,
        }
    }

    /// Set how long a single peer gets to answer.
    pub fn peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout = timeout;
        self
    }

    /// Set how many peers are queried at once.
    pub fn fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// The state this coordinator commits to.
    pub fn state(&self) -> &Arc<CutoffState> {
        &self.state
    }

    /// Run one consensus cycle and commit the resulting cutoff.
    ///
    /// Peers that fail or time out are skipped. Only a malformed order time,
    /// hit while computing the local fallback, fails the cycle; in that case
    /// the state is left untouched.
    pub async fn reconcile(&self, orders: &[Order]) -> Result<Reconciliation, TimeError> {
        let peers = self.directory.peers().await;
        let start = self.state.get();
        debug!(peers = peers.len(), ?start, "Querying peers for cutoff");

        let tally = stream::iter(peers)
            .map(|peer| async move {
                let reply = self.query(&peer).await;
                (peer, reply)
            })
            .buffer_unordered(self.fan_out)
            .fold(Tally::new(start), |mut tally, (peer, reply)| async move {
                tally.observe(peer, reply);
                tally
            })
            .await;

        let (cutoff, source) = match tally.cutoff {
            Some(cutoff) if tally.lowered => (Some(cutoff), CutoffSource::Peers),
            Some(cutoff) => (Some(cutoff), CutoffSource::Existing),
            None => match latest_order_time(orders)? {
                Some(latest) => (Some(latest), CutoffSource::Orders),
                None => (None, CutoffSource::Unset),
            },
        };

        self.state.set(cutoff);
        info!(
            ?cutoff,
            ?source,
            replies = tally.replies,
            unavailable = tally.unavailable.len(),
            "Cutoff reconciled"
        );

        Ok(Reconciliation {
            cutoff,
            source,
            replies: tally.replies,
            disagreements: tally.disagreements,
            unavailable: tally.unavailable,
        })
    }

    async fn query(&self, peer: &Peer) -> Result<Option<i64>, PeerError> {
        match tokio::time::timeout(self.peer_timeout, self.client.fetch_cutoff(peer)).await {
            Ok(reply) => reply,
            Err(_) => Err(PeerError::Timeout(
                u64::try_from(self.peer_timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }
}

/// Latest order time in epoch milliseconds, or `None` for no orders.
pub fn latest_order_time(orders: &[Order]) -> Result<Option<i64>, TimeError> {
    let mut latest: Option<i64> = None;
    for order in orders {
        let millis = order.millis()?;
        latest = Some(latest.map_or(millis, |current| current.max(millis)));
    }
    Ok(latest)
}
