//! The rule deciding when a tx's opinion is stable enough to retire.

#[cfg(test)]
#[path = "finalization_test.rs"]
mod finalization_test;

use fpc_consensus_config::FpcConfig;

use crate::history::OpinionLog;

/// Finalizes a tx once its decision history is past the cooldown and ends in
/// a long-enough run of identical opinions.
///
/// Only decision entries count: the submitted initial opinion is excluded
/// from both the cooldown and the stability window.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FinalizationRule {
    /// Leading decision rounds ignored (`m`).
    cooldown: usize,
    /// Required length of the identical tail (`l`).
    window: usize,
}

impl FinalizationRule {
    pub(crate) fn new(config: &FpcConfig) -> Self {
        Self { cooldown: config.m, window: config.l }
    }

    pub(crate) fn is_final(&self, log: &OpinionLog) -> bool {
        let decisions = log.decisions();
        if decisions.len() < self.cooldown + self.window {
            return false;
        }
        let tail = &decisions[decisions.len() - self.window..];
        tail.iter().all(|opinion| *opinion == tail[0])
    }
}
