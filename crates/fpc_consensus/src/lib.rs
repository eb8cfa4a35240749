//! Fast Probabilistic Consensus (FPC) voting engine.
//!
//! A per-node component that drives a population of disputed transactions to
//! finalized like/dislike decisions. Each round, the engine samples `k`
//! random peers for their current opinions, aggregates the replies into
//! per-tx vote ratios, and compares those ratios against a threshold derived
//! from a common random shared by the whole network. A tx is retired once
//! its opinion has been stable for long enough.
//!
//! ## Architecture
//!
//! - [`manager`]: the [`FpcInstance`] facade and the driver task that
//!   serializes rounds.
//! - [`types`]: identifiers, opinions, ticks, the [`VotingContext`]
//!   collaborator trait, and [`FpcError`].
//! - `state` / `history`: the waiting/active sets and the per-tx opinion
//!   logs.
//! - `threshold` / `finalization`: the per-round decision threshold and the
//!   stability rule that retires txs.
//! - `sampler`: the k-fanout peer query and its vote aggregation.
//!
//! Ticks come from an external common-random beacon; peer discovery and the
//! query transport are host concerns behind [`VotingContext`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fpc_consensus::types::{NodeId, Opinion, TxId, TxOpinion, VotingContext};
//! use fpc_consensus::FpcInstance;
//! use fpc_consensus_config::FpcConfig;
//!
//! struct Network;
//!
//! #[async_trait::async_trait]
//! impl VotingContext for Network {
//!     fn known_peers(&self) -> Vec<NodeId> {
//!         vec![]
//!     }
//!     async fn query_opinions(&self, _node: NodeId, _txs: Arc<[TxId]>) -> Vec<Opinion> {
//!         vec![]
//!     }
//! }
//!
//! # async fn example() {
//! let (mut fpc, mut finalized) =
//!     FpcInstance::new(Arc::new(Network), FpcConfig::default()).unwrap();
//! fpc.submit_txs_for_voting([TxOpinion { tx_id: "tx".into(), opinion: Opinion::Like }]);
//! fpc.tick(0, 0.42);
//! # }
//! ```
//!
//! [`FpcInstance`]: manager::FpcInstance
//! [`VotingContext`]: types::VotingContext
//! [`FpcError`]: types::FpcError

mod finalization;
mod history;
pub mod manager;
pub mod metrics;
mod round;
mod sampler;
mod state;
#[cfg(test)]
pub mod test_utils;
mod threshold;
pub mod types;

pub use manager::FpcInstance;
pub use types::{Opinion, TxId, TxOpinion};
