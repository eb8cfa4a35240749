//! Configuration for the Fast Probabilistic Consensus (FPC) voting engine.
//!
//! The parameter names follow the protocol literature: `k` is the query
//! fanout, `[a, b]` bounds the first-round decision threshold, `beta` shapes
//! the threshold band of later rounds, and `m`/`l` control finalization.

pub mod config;

pub use config::FpcConfig;
