//! Metric definitions for the voting engine.

use metrics::{describe_counter, describe_gauge};

/// Voting rounds executed.
pub const FPC_ROUNDS: &str = "fpc_rounds_total";
/// Finalized decisions emitted.
pub const FPC_FINALIZED_TXS: &str = "fpc_finalized_txs_total";
/// Current size of the active set.
pub const FPC_ACTIVE_TXS: &str = "fpc_active_txs";
/// Submitted txs not yet promoted into the active set.
pub const FPC_WAITING_TXS: &str = "fpc_waiting_txs";
/// Queries that failed, answered nothing, or answered out of alignment.
pub const FPC_QUERY_FAILURES: &str = "fpc_query_failures_total";
/// Rounds that skipped sampling because no peers were known.
pub const FPC_EMPTY_PEER_SET_ROUNDS: &str = "fpc_empty_peer_set_rounds_total";
/// Tick randoms outside [0, 1], clamped on intake.
pub const FPC_OUT_OF_RANGE_RANDOMS: &str = "fpc_out_of_range_randoms_total";

pub(crate) fn register_metrics() {
    describe_counter!(FPC_ROUNDS, "The total number of voting rounds executed");
    describe_counter!(FPC_FINALIZED_TXS, "The total number of finalized decisions emitted");
    describe_gauge!(FPC_ACTIVE_TXS, "The number of txs currently voting");
    describe_gauge!(FPC_WAITING_TXS, "The number of submitted txs awaiting promotion");
    describe_counter!(
        FPC_QUERY_FAILURES,
        "The total number of opinion queries recovered as empty responses"
    );
    describe_counter!(
        FPC_EMPTY_PEER_SET_ROUNDS,
        "The total number of rounds that skipped sampling for lack of peers"
    );
    describe_counter!(
        FPC_OUT_OF_RANGE_RANDOMS,
        "The total number of tick randoms clamped into [0, 1]"
    );
}
