//! The synchronous phases of a voting round.
//!
//! [`RoundDriver`] executes intake, opinion update, and finalization over the
//! shared state; it performs no IO and dispatches no queries. The sampling
//! phase is driven by the engine task in `manager`.

#[cfg(test)]
#[path = "round_test.rs"]
mod round_test;

use fpc_consensus_config::FpcConfig;
use tracing::{debug, warn};

use crate::finalization::FinalizationRule;
use crate::state::{Eta, VotingState};
use crate::threshold::decision_threshold;
use crate::types::{Opinion, Tick, TxId, TxOpinion};

/// Executes phases 1–3 of a round: intake, update, finalize.
pub(crate) struct RoundDriver {
    config: FpcConfig,
    finalization: FinalizationRule,
}

impl RoundDriver {
    pub(crate) fn new(config: FpcConfig) -> Self {
        let finalization = FinalizationRule::new(&config);
        Self { config, finalization }
    }

    /// Runs the synchronous phases over `state` and returns the txs
    /// finalized this round, already retired from the state.
    pub(crate) fn run_update_phases(
        &self,
        state: &mut VotingState,
        tick: Tick,
    ) -> Vec<TxOpinion> {
        state.promote_waiting();
        self.update_opinions(state, tick);
        self.collect_finalized(state)
    }

    /// Appends one opinion to every tx that has a sampling aggregate,
    /// comparing the aggregate against this round's threshold. Strictly
    /// greater wins: a ratio equal to the threshold resolves to Dislike.
    /// Unvoted txs are skipped; their history grows only once votes arrive.
    fn update_opinions(&self, state: &mut VotingState, tick: Tick) {
        let voted: Vec<(TxId, f64)> = state
            .iter_active()
            .filter_map(|(tx, eta)| match eta {
                Eta::Voted(vote_ratio) => Some((tx.clone(), vote_ratio.ratio)),
                Eta::Unvoted => None,
            })
            .collect();
        for (tx, ratio) in voted {
            let Some(log) = state.histories.load(&tx) else {
                warn!(%tx, "active tx with no opinion history; skipping update");
                continue;
            };
            let threshold = decision_threshold(log.len(), tick.x, &self.config);
            state.histories.append(&tx, Opinion::from_bool(ratio > threshold));
        }
    }

    /// Sweeps the active set for txs whose histories satisfy the
    /// finalization rule and retires them.
    fn collect_finalized(&self, state: &mut VotingState) -> Vec<TxOpinion> {
        let ready: Vec<TxId> = state
            .iter_active()
            .map(|(tx, _)| tx)
            .filter(|tx| {
                state.histories.load(tx).is_some_and(|log| self.finalization.is_final(log))
            })
            .cloned()
            .collect();

        let mut finalized = Vec::new();
        for tx in ready {
            let opinion = match state.histories.last_opinion(&tx) {
                Ok(opinion) => opinion,
                Err(err) => {
                    warn!("finalizing from an empty history, recording Dislike: {err}");
                    Opinion::Dislike
                }
            };
            debug!(%tx, ?opinion, "tx finalized");
            state.retire(&tx);
            finalized.push(TxOpinion { tx_id: tx, opinion });
        }
        finalized
    }
}
