// ABOUTME: Peer seams - who the other instances are and how to ask them.
// ABOUTME: HttpPeerClient queries GET {peer}/train/timestamp over reqwest.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use super::UNSET_SENTINEL;
use crate::error::PeerError;

/// Path every instance serves its cutoff on, relative to its base URL.
pub const TIMESTAMP_PATH: &str = "train/timestamp";

/// Another running instance of the recommender.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Peer {
    /// Base URL, e.g. `http://recommender-2:8080`.
    pub base_url: String,
}

impl Peer {
    /// Create a peer from its base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// URL of the peer's cutoff endpoint.
    pub fn timestamp_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), TIMESTAMP_PATH)
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

/// Enumerates the peers known right now. The set may be empty.
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    async fn peers(&self) -> Vec<Peer>;
}

/// Asks one peer for its cutoff.
///
/// Returns `Ok(None)` when the peer answered but holds no cutoff yet.
#[async_trait]
pub trait PeerClient: Send + Sync {
    async fn fetch_cutoff(&self, peer: &Peer) -> Result<Option<i64>, PeerError>;
}

/// A fixed peer list, typically from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticPeers {
    peers: Vec<Peer>,
}

impl StaticPeers {
    /// Create a directory from base URLs. Blank entries are skipped.
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers = urls
            .into_iter()
            .map(|u| u.as_ref().trim().to_string())
            .filter(|u| !u.is_empty())
            .map(Peer::new)
            .collect();
        Self { peers }
    }

    /// Number of configured peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[async_trait]
impl PeerDirectory for StaticPeers {
    async fn peers(&self) -> Vec<Peer> {
        self.peers.clone()
    }
}

/// Queries peers over HTTP with a plain-text integer body.
pub struct HttpPeerClient {
    client: reqwest::Client,
}

impl HttpPeerClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, PeerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("recsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PeerClient for HttpPeerClient {
    async fn fetch_cutoff(&self, peer: &Peer) -> Result<Option<i64>, PeerError> {
        let response = self
            .client
            .get(peer.timestamp_url())
            .header(reqwest::header::ACCEPT, "text/plain")
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(PeerError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_cutoff_body(&body)
    }
}

/// Decode a peer's plain-text cutoff, mapping the unset sentinel to `None`.
pub fn parse_cutoff_body(body: &str) -> Result<Option<i64>, PeerError> {
    let millis = body
        .trim()
        .parse::<i64>()
        .map_err(|_| PeerError::InvalidBody(body.to_string()))?;

    Ok((millis != UNSET_SENTINEL).then_some(millis))
}
