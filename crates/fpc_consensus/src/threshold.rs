//! Round-specific decision thresholds.

#[cfg(test)]
#[path = "threshold_test.rs"]
mod threshold_test;

use fpc_consensus_config::FpcConfig;

/// Computes the decision threshold for a tx from the length of its opinion
/// history and the common random `x` of the current tick.
///
/// A history of length 1 holds only the submitted initial opinion, so the tx
/// is in its first decision round and draws from `[a, b]`; later rounds draw
/// from `[beta, 1 - beta]`. The same `x` must be shared by every tx in the
/// round; it is never resampled per tx.
pub(crate) fn decision_threshold(history_len: usize, x: f64, config: &FpcConfig) -> f64 {
    if history_len == 1 {
        runif(x, config.a, config.b)
    } else {
        runif(x, config.beta, 1.0 - config.beta)
    }
}

/// Maps `x` in `[0, 1]` uniformly onto `[lower, upper]`.
fn runif(x: f64, lower: f64, upper: f64) -> f64 {
    lower + x * (upper - lower)
}
