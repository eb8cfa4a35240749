//! This module contains the configuration for the voting engine, including
//! the [`FpcConfig`] struct and the validation rules enforced when an engine
//! is constructed.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Protocol parameters of a voting instance.
///
/// The decision threshold of a tx's first decision round is drawn uniformly
/// from `[a, b]`; later rounds draw from `[beta, 1 - beta]`. Both draws are
/// driven by the common random carried on each tick.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Validate)]
#[validate(schema(function = "validate_threshold_bounds"))]
pub struct FpcConfig {
    /// Number of peers queried each round.
    #[validate(range(min = 1))]
    pub k: usize,
    /// Lower bound of the first-round decision threshold.
    #[validate(range(min = 0.0, max = 1.0))]
    pub a: f64,
    /// Upper bound of the first-round decision threshold. Must be at least `a`.
    #[validate(range(min = 0.0, max = 1.0))]
    pub b: f64,
    /// Threshold band parameter of later rounds; the threshold lies in
    /// `[beta, 1 - beta]`, so `beta` must be below one half.
    #[validate(range(min = 0.0))]
    pub beta: f64,
    /// Number of leading decision rounds ignored by the finalization rule.
    pub m: usize,
    /// Number of trailing identical opinions required to finalize a tx.
    #[validate(range(min = 1))]
    pub l: usize,
    /// Capacity of the finalized-batches channel. Must be at least 1 so a
    /// host that both drives ticks and consumes batches cannot deadlock.
    #[validate(range(min = 1))]
    pub finalized_channel_capacity: usize,
    /// Capacity of the internal tick queue.
    #[validate(range(min = 1))]
    pub tick_channel_capacity: usize,
}

impl Default for FpcConfig {
    fn default() -> Self {
        Self {
            k: 10,
            a: 0.75,
            b: 0.85,
            beta: 0.3,
            m: 3,
            l: 3,
            finalized_channel_capacity: 16,
            tick_channel_capacity: 16,
        }
    }
}

pub fn validate_threshold_bounds(config: &FpcConfig) -> Result<(), ValidationError> {
    if config.a > config.b {
        return Err(ValidationError::new("first round threshold bounds inverted (a > b)"));
    }
    if config.beta >= 0.5 {
        return Err(ValidationError::new("beta must be below 0.5"));
    }
    Ok(())
}
