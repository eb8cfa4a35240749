//! Shared types of the voting engine: identifiers, opinions, ticks, the
//! collaborator interface, and the engine error type.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

/// The round index carried by a tick.
pub type RoundIndex = u64;

/// A peer identifier as enumerated by the discovery service.
pub type NodeId = String;

/// Opaque identifier of an object under dispute (e.g. a transaction hash).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxId(Vec<u8>);

impl TxId {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for TxId {
    fn from(id: &str) -> Self {
        Self(id.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for TxId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// A single like/dislike opinion on a disputed object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opinion {
    Like,
    Dislike,
}

impl Opinion {
    /// `true` maps to `Like`, the positive-response convention of opinion
    /// queries.
    pub fn from_bool(liked: bool) -> Self {
        if liked { Opinion::Like } else { Opinion::Dislike }
    }

    pub fn is_like(self) -> bool {
        matches!(self, Opinion::Like)
    }
}

/// The opinion a node holds for a given object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOpinion {
    pub tx_id: TxId,
    pub opinion: Opinion,
}

/// An external timing pulse: a round index plus the common random shared by
/// every node in that round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub index: RoundIndex,
    /// Common random in `[0, 1]`, mixed into every threshold this round.
    pub x: f64,
}

impl Tick {
    pub fn new(index: RoundIndex, x: f64) -> Self {
        Self { index, x }
    }
}

/// Interface to the node components the engine collaborates with.
///
/// The transport is expected to time-bound queries: a query that cannot be
/// answered must resolve to an empty reply rather than hang the round.
#[async_trait]
pub trait VotingContext: Send + Sync {
    /// Snapshot of the currently known peers. Consumed once per round and
    /// never cached by the engine.
    fn known_peers(&self) -> Vec<NodeId>;

    /// Asks `node` for its current opinion on each of `txs`.
    ///
    /// The reply must be positionally aligned with `txs`. An empty reply
    /// means the node failed to answer or holds no opinions.
    async fn query_opinions(&self, node: NodeId, txs: Arc<[TxId]>) -> Vec<Opinion>;
}

/// Errors surfaced by the voting engine.
#[derive(Debug, thiserror::Error)]
pub enum FpcError {
    /// The supplied parameters violate the protocol bounds. Detected at
    /// construction; the engine refuses to build.
    #[error("invalid voting parameters: {0}")]
    ParameterViolation(#[from] validator::ValidationErrors),
    /// An opinion was requested for a tx with no recorded history. Reachable
    /// only through internal misuse; readers recover by treating the opinion
    /// as Dislike.
    #[error("empty opinion history for tx {0}")]
    EmptyHistory(TxId),
}
