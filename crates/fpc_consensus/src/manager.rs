//! Top level of the voting engine.
//!
//! [`FpcInstance`] is the host-facing facade: submit txs, feed ticks from the
//! common-random beacon, read interim opinions, and consume finalized
//! batches. A dedicated driver task consumes the tick queue, which
//! serializes rounds and keeps finalized batches in tick order. Within a
//! round, batch emission proceeds concurrently with the sampling fan-out;
//! the batch is already computed before queries are dispatched.

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;

use std::sync::{Arc, Mutex, MutexGuard};

use fpc_consensus_config::FpcConfig;
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::metrics::{
    register_metrics,
    FPC_ACTIVE_TXS,
    FPC_FINALIZED_TXS,
    FPC_OUT_OF_RANGE_RANDOMS,
    FPC_ROUNDS,
    FPC_WAITING_TXS,
};
use crate::round::RoundDriver;
use crate::sampler::query_sample;
use crate::state::VotingState;
use crate::types::{FpcError, Opinion, RoundIndex, Tick, TxId, TxOpinion, VotingContext};

/// A handle to a running voting instance.
///
/// Dropping the instance closes the tick queue; the driver task winds down
/// after the in-flight round completes.
pub struct FpcInstance {
    state: Arc<Mutex<VotingState>>,
    ticks_sender: mpsc::Sender<Tick>,
    driver: JoinHandle<()>,
}

impl FpcInstance {
    /// Creates a voting instance and spawns its driver task.
    ///
    /// Returns the instance together with the finalized-batches receiver:
    /// one batch per tick, possibly empty, delivered in tick order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        context: Arc<dyn VotingContext>,
        config: FpcConfig,
    ) -> Result<(Self, mpsc::Receiver<Vec<TxOpinion>>), FpcError> {
        Self::with_rng(context, config, StdRng::from_entropy())
    }

    /// Same as [`FpcInstance::new`] with a caller-supplied peer-selection
    /// RNG, for deterministic tests.
    pub fn with_rng(
        context: Arc<dyn VotingContext>,
        config: FpcConfig,
        rng: StdRng,
    ) -> Result<(Self, mpsc::Receiver<Vec<TxOpinion>>), FpcError> {
        config.validate()?;
        register_metrics();
        let (ticks_sender, ticks_receiver) = mpsc::channel(config.tick_channel_capacity);
        let (finalized_sender, finalized_receiver) =
            mpsc::channel(config.finalized_channel_capacity);
        let state = Arc::new(Mutex::new(VotingState::default()));
        let vote_loop = VoteLoop {
            state: state.clone(),
            context,
            round_driver: RoundDriver::new(config.clone()),
            config,
            ticks_receiver,
            finalized_sender,
            rng,
        };
        let driver = tokio::spawn(vote_loop.run());
        Ok((Self { state, ticks_sender, driver }, finalized_receiver))
    }

    /// Queues txs for voting; they enter the active set on the next tick.
    ///
    /// Non-blocking: appends to the waiting set under a short lock. A tx
    /// submitted again before its first tick keeps the later initial
    /// opinion; a tx already voting ignores resubmission.
    pub fn submit_txs_for_voting(&self, txs: impl IntoIterator<Item = TxOpinion>) {
        self.lock_state().push_txs(txs);
    }

    /// Feeds one tick from the common-random beacon, triggering a round.
    ///
    /// Non-blocking; the finalized batch is emitted asynchronously on the
    /// channel returned at construction. Randoms outside `[0, 1]` are
    /// clamped and counted, never rejected.
    pub fn tick(&mut self, index: RoundIndex, random: f64) {
        let x = if (0.0..=1.0).contains(&random) {
            random
        } else {
            warn!(index, random, "tick random outside [0, 1]; clamping");
            counter!(FPC_OUT_OF_RANGE_RANDOMS).increment(1);
            random.clamp(0.0, 1.0)
        };
        match self.ticks_sender.try_send(Tick::new(index, x)) {
            Ok(()) => {}
            Err(err) if err.is_full() => warn!(index, "tick queue full; tick dropped"),
            Err(_) => debug!(index, "driver task stopped; tick dropped"),
        }
    }

    /// Latest recorded opinion for `tx`; `None` if the tx is unknown, still
    /// waiting for promotion, or already finalized.
    pub fn interim_opinion(&self, tx: &TxId) -> Option<Opinion> {
        self.lock_state().histories.load(tx).and_then(|log| log.last())
    }

    /// Batch form of [`FpcInstance::interim_opinion`], answering
    /// positionally.
    pub fn interim_opinions(&self, txs: &[TxId]) -> Vec<Option<Opinion>> {
        let state = self.lock_state();
        txs.iter().map(|tx| state.histories.load(tx).and_then(|log| log.last())).collect()
    }

    /// Closes the tick queue and waits for the driver task to finish the
    /// in-flight round.
    pub async fn shutdown(self) {
        drop(self.ticks_sender);
        if let Err(err) = self.driver.await {
            warn!("vote loop task failed: {err}");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, VotingState> {
        self.state.lock().expect("voting state lock poisoned")
    }
}

/// The single consumer of the tick queue.
struct VoteLoop {
    state: Arc<Mutex<VotingState>>,
    context: Arc<dyn VotingContext>,
    round_driver: RoundDriver,
    config: FpcConfig,
    ticks_receiver: mpsc::Receiver<Tick>,
    finalized_sender: mpsc::Sender<Vec<TxOpinion>>,
    rng: StdRng,
}

impl VoteLoop {
    async fn run(mut self) {
        info!("vote loop started");
        while let Some(tick) = self.ticks_receiver.next().await {
            self.run_round(tick).await;
        }
        debug!("tick queue closed; vote loop exiting");
    }

    /// One full round: the synchronous phases under the lock, then batch
    /// emission joined with the sampling fan-out, then eta write-back.
    ///
    /// The lock is never held across an await; `submit_txs_for_voting` and
    /// interim readers interleave freely with the sampling phase.
    #[instrument(skip_all, fields(round = tick.index))]
    async fn run_round(&mut self, tick: Tick) {
        let (finalized, active_txs) = {
            let mut state = self.lock_state();
            let finalized = self.round_driver.run_update_phases(&mut state, tick);
            (finalized, state.active_txs())
        };
        counter!(FPC_ROUNDS).increment(1);
        if !finalized.is_empty() {
            counter!(FPC_FINALIZED_TXS).increment(finalized.len() as u64);
            info!(count = finalized.len(), "txs finalized this round");
        }

        let peers = self.context.known_peers();
        let emit = Self::emit_finalized(&mut self.finalized_sender, finalized);
        let sample =
            query_sample(&self.context, active_txs, self.config.k, peers, &mut self.rng);
        let ((), etas) = futures::join!(emit, sample);

        let mut state = self.lock_state();
        state.record_vote_ratios(etas);
        gauge!(FPC_ACTIVE_TXS).set(state.active_len() as f64);
        gauge!(FPC_WAITING_TXS).set(state.waiting_len() as f64);
    }

    /// Pushes the batch onto the output channel, honoring consumer-side
    /// backpressure. A dropped receiver is not fatal: voting continues and
    /// interim opinions stay readable.
    async fn emit_finalized(sender: &mut mpsc::Sender<Vec<TxOpinion>>, batch: Vec<TxOpinion>) {
        if sender.send(batch).await.is_err() {
            debug!("finalized channel receiver dropped; batch discarded");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, VotingState> {
        self.state.lock().expect("voting state lock poisoned")
    }
}
