//! Two-tier membership of disputed transactions: submitted-but-waiting vs
//! currently voting, plus the sampling aggregate attached to each active tx.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::HashMap;
use std::fmt;

use crate::history::HistoryStore;
use crate::types::{TxId, TxOpinion};

/// Aggregate of the most recent sampling round for one tx.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct VoteRatio {
    /// Fraction of positive responses, in `[0, 1]`.
    pub ratio: f64,
    /// Number of queried peers that answered with an opinion for this tx.
    pub count: usize,
}

impl fmt::Display for VoteRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ratio: {} count: {}", self.ratio, self.count)
    }
}

/// Sampling state of an active tx. A freshly promoted tx is `Unvoted` until
/// a round returns opinions for it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) enum Eta {
    #[default]
    Unvoted,
    Voted(VoteRatio),
}

/// The engine's mutable voting state.
///
/// All access is serialized by the engine lock; the round driver is the only
/// writer of histories.
#[derive(Debug, Default)]
pub(crate) struct VotingState {
    /// Submissions since the last round, in arrival order.
    waiting: Vec<TxOpinion>,
    /// Transactions currently voting, with their latest sampling aggregate.
    active: HashMap<TxId, Eta>,
    pub(crate) histories: HistoryStore,
}

impl VotingState {
    pub(crate) fn push_txs(&mut self, txs: impl IntoIterator<Item = TxOpinion>) {
        self.waiting.extend(txs);
    }

    /// Drains the waiting set into the active set.
    ///
    /// Later submissions of the same tx override earlier ones; a tx that is
    /// already voting is left untouched.
    pub(crate) fn promote_waiting(&mut self) {
        let mut initial_opinions = HashMap::new();
        for TxOpinion { tx_id, opinion } in self.waiting.drain(..) {
            if self.active.contains_key(&tx_id) {
                continue;
            }
            initial_opinions.insert(tx_id, opinion);
        }
        for (tx_id, opinion) in initial_opinions {
            self.histories.init(tx_id.clone(), opinion);
            self.active.insert(tx_id, Eta::Unvoted);
        }
    }

    pub(crate) fn iter_active(&self) -> impl Iterator<Item = (&TxId, &Eta)> {
        self.active.iter()
    }

    pub(crate) fn active_txs(&self) -> Vec<TxId> {
        self.active.keys().cloned().collect()
    }

    pub(crate) fn active_len(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    #[cfg(test)]
    pub(crate) fn eta(&self, tx: &TxId) -> Option<Eta> {
        self.active.get(tx).copied()
    }

    /// Removes a finalized tx from the active set and the history store.
    pub(crate) fn retire(&mut self, tx: &TxId) {
        self.active.remove(tx);
        self.histories.delete(tx);
    }

    /// Overwrites the aggregates of the txs a sampling round answered for.
    /// Active txs absent from `etas` keep their previous aggregate.
    pub(crate) fn record_vote_ratios(&mut self, etas: HashMap<TxId, VoteRatio>) {
        for (tx, ratio) in etas {
            if let Some(eta) = self.active.get_mut(&tx) {
                *eta = Eta::Voted(ratio);
            }
        }
    }
}
