//! Per-transaction opinion logs and the store that owns them.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::types::{FpcError, Opinion, TxId};

/// Append-only log of the opinions a tx held across rounds.
///
/// Index 0 is the opinion supplied at submission; every later entry is the
/// outcome of one decision round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct OpinionLog(Vec<Opinion>);

impl OpinionLog {
    pub(crate) fn new(initial: Opinion) -> Self {
        Self(vec![initial])
    }

    pub(crate) fn append(&mut self, opinion: Opinion) {
        self.0.push(opinion);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// The most recent opinion, if any entry exists.
    pub(crate) fn last(&self) -> Option<Opinion> {
        self.0.last().copied()
    }

    /// Entries produced by decision rounds, i.e. everything after the
    /// submitted initial opinion.
    pub(crate) fn decisions(&self) -> &[Opinion] {
        self.0.get(1..).unwrap_or(&[])
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[Opinion] {
        &self.0
    }
}

impl fmt::Display for OpinionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for opinion in &self.0 {
            write!(f, "{}", if opinion.is_like() { 'L' } else { 'D' })?;
        }
        Ok(())
    }
}

/// Owns the opinion log of every tx currently under voting.
///
/// Reads and writes are sequenced by the round driver; the engine lock is
/// the only synchronization required.
#[derive(Debug, Default)]
pub(crate) struct HistoryStore {
    logs: HashMap<TxId, OpinionLog>,
}

impl HistoryStore {
    /// Seeds the log of `tx` with its submitted initial opinion, replacing
    /// any log recorded for an earlier submission.
    pub(crate) fn init(&mut self, tx: TxId, initial: Opinion) {
        self.logs.insert(tx, OpinionLog::new(initial));
    }

    pub(crate) fn load(&self, tx: &TxId) -> Option<&OpinionLog> {
        self.logs.get(tx)
    }

    pub(crate) fn append(&mut self, tx: &TxId, opinion: Opinion) {
        match self.logs.get_mut(tx) {
            Some(log) => log.append(opinion),
            None => warn!(%tx, "appending opinion for a tx with no history; dropped"),
        }
    }

    pub(crate) fn delete(&mut self, tx: &TxId) {
        self.logs.remove(tx);
    }

    /// The most recent opinion of `tx`.
    ///
    /// Every tracked tx has at least its initial opinion, so an error here
    /// indicates internal misuse.
    pub(crate) fn last_opinion(&self, tx: &TxId) -> Result<Opinion, FpcError> {
        self.load(tx)
            .and_then(OpinionLog::last)
            .ok_or_else(|| FpcError::EmptyHistory(tx.clone()))
    }
}
