use std::collections::HashMap;

use fpc_consensus_config::FpcConfig;

use super::RoundDriver;
use crate::state::{VoteRatio, VotingState};
use crate::test_utils::tx_opinion;
use crate::types::Opinion::{Dislike, Like};
use crate::types::{Tick, TxId, TxOpinion};

fn test_config() -> FpcConfig {
    FpcConfig { k: 3, a: 0.5, b: 0.5, beta: 0.3, m: 2, l: 3, ..Default::default() }
}

/// Simulates the sampling phase: every queried peer answered with the given
/// like-ratio for `tx`.
fn record_ratio(state: &mut VotingState, tx: &TxId, ratio: f64) {
    state.record_vote_ratios(HashMap::from([(tx.clone(), VoteRatio { ratio, count: 3 })]));
}

#[test]
fn unanimous_likes_finalize_after_cooldown_and_window() {
    let tx = TxId::from("t1");
    let driver = RoundDriver::new(test_config());
    let mut state = VotingState::default();
    state.push_txs([tx_opinion("t1", Like)]);

    // Round 0 only promotes; rounds 1..=4 accumulate decisions; round 5
    // reaches m + l decision entries with a stable tail.
    for round in 0..5 {
        let finalized = driver.run_update_phases(&mut state, Tick::new(round, 0.5));
        assert!(finalized.is_empty(), "unexpected finalization at round {round}");
        let expected_len = 1 + round as usize;
        assert_eq!(state.histories.load(&tx).unwrap().len(), expected_len);
        record_ratio(&mut state, &tx, 1.0);
    }
    let finalized = driver.run_update_phases(&mut state, Tick::new(5, 0.5));
    assert_eq!(finalized, vec![tx_opinion("t1", Like)]);
    assert_eq!(state.active_len(), 0);
    assert!(state.histories.load(&tx).is_none());
}

#[test]
fn alternating_unanimous_rounds_never_finalize() {
    let tx = TxId::from("t1");
    let driver = RoundDriver::new(test_config());
    let mut state = VotingState::default();
    state.push_txs([tx_opinion("t1", Like)]);

    for round in 0..100 {
        let finalized = driver.run_update_phases(&mut state, Tick::new(round, 0.5));
        assert!(finalized.is_empty(), "unexpected finalization at round {round}");
        record_ratio(&mut state, &tx, if round % 2 == 0 { 1.0 } else { 0.0 });
    }
    assert_eq!(state.active_len(), 1);
}

#[test]
fn ratio_equal_to_threshold_resolves_to_dislike() {
    let tx = TxId::from("t1");
    let driver = RoundDriver::new(test_config());
    let mut state = VotingState::default();
    state.push_txs([tx_opinion("t1", Like)]);

    driver.run_update_phases(&mut state, Tick::new(0, 0.5));
    record_ratio(&mut state, &tx, 0.5);
    // First decision round: threshold = a = b = 0.5 and eta = 0.5.
    driver.run_update_phases(&mut state, Tick::new(1, 0.5));
    assert_eq!(state.histories.load(&tx).unwrap().entries(), &[Like, Dislike]);
}

#[test]
fn zero_threshold_flips_a_dislike_prior_on_any_positive_ratio() {
    let tx = TxId::from("t1");
    let config = FpcConfig { a: 0.0, b: 1.0, ..test_config() };
    let driver = RoundDriver::new(config);
    let mut state = VotingState::default();
    state.push_txs([tx_opinion("t1", Dislike)]);

    driver.run_update_phases(&mut state, Tick::new(0, 0.0));
    record_ratio(&mut state, &tx, 0.01);
    // First decision round with x = 0: threshold collapses to a = 0.
    driver.run_update_phases(&mut state, Tick::new(1, 0.0));
    assert_eq!(state.histories.load(&tx).unwrap().entries(), &[Dislike, Like]);
}

#[test]
fn unvoted_txs_are_skipped_by_the_update_phase() {
    let tx = TxId::from("t1");
    let driver = RoundDriver::new(test_config());
    let mut state = VotingState::default();
    state.push_txs([tx_opinion("t1", Like)]);

    for round in 0..10 {
        let finalized = driver.run_update_phases(&mut state, Tick::new(round, 0.5));
        assert!(finalized.is_empty());
    }
    assert_eq!(state.histories.load(&tx).unwrap().entries(), &[Like]);
}

#[test]
fn carried_aggregate_keeps_updating_when_sampling_goes_quiet() {
    let tx = TxId::from("t1");
    let driver = RoundDriver::new(test_config());
    let mut state = VotingState::default();
    state.push_txs([tx_opinion("t1", Like)]);

    driver.run_update_phases(&mut state, Tick::new(0, 0.5));
    record_ratio(&mut state, &tx, 1.0);
    // No further sampling results; the recorded aggregate carries forward
    // and keeps producing decisions until finalization.
    for round in 1..5 {
        let finalized = driver.run_update_phases(&mut state, Tick::new(round, 0.5));
        assert!(finalized.is_empty(), "unexpected finalization at round {round}");
    }
    let finalized = driver.run_update_phases(&mut state, Tick::new(5, 0.5));
    assert_eq!(finalized, vec![tx_opinion("t1", Like)]);
}

#[test]
fn opposing_txs_finalize_in_the_same_round() {
    let t1 = TxId::from("t1");
    let t2 = TxId::from("t2");
    let driver = RoundDriver::new(test_config());
    let mut state = VotingState::default();
    state.push_txs([tx_opinion("t1", Like), tx_opinion("t2", Dislike)]);

    let mut finalized: Vec<TxOpinion> = Vec::new();
    for round in 0..=5 {
        finalized.extend(driver.run_update_phases(&mut state, Tick::new(round, 0.5)));
        state.record_vote_ratios(HashMap::from([
            (t1.clone(), VoteRatio { ratio: 0.8, count: 5 }),
            (t2.clone(), VoteRatio { ratio: 0.2, count: 5 }),
        ]));
    }
    finalized.sort_by(|left, right| left.tx_id.cmp(&right.tx_id));
    assert_eq!(finalized, vec![tx_opinion("t1", Like), tx_opinion("t2", Dislike)]);
    assert_eq!(state.active_len(), 0);
}

#[test]
fn finalized_txs_stay_retired_in_later_rounds() {
    let tx = TxId::from("t1");
    let driver = RoundDriver::new(test_config());
    let mut state = VotingState::default();
    state.push_txs([tx_opinion("t1", Like)]);

    for round in 0..=5 {
        driver.run_update_phases(&mut state, Tick::new(round, 0.5));
        record_ratio(&mut state, &tx, 1.0);
    }
    for round in 6..10 {
        let finalized = driver.run_update_phases(&mut state, Tick::new(round, 0.5));
        assert!(finalized.is_empty());
    }
    assert!(state.histories.load(&tx).is_none());
}
