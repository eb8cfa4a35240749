//! Random peer sampling and per-tx vote aggregation.

#[cfg(test)]
#[path = "sampler_test.rs"]
mod sampler_test;

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use metrics::counter;
use rand::Rng;
use tracing::{debug, warn};

use crate::metrics::{FPC_EMPTY_PEER_SET_ROUNDS, FPC_QUERY_FAILURES};
use crate::state::VoteRatio;
use crate::types::{NodeId, TxId, VotingContext};

/// Queries `k` randomly chosen peers for their opinions on `txs` and
/// aggregates the replies into per-tx vote ratios.
///
/// Peers are drawn i.i.d. with replacement, so one peer's opinion may count
/// several times in a round. The sampler waits for all `k` completions; a
/// failed query resolves to an empty reply and contributes nothing. Txs for
/// which no query returned an opinion are absent from the result.
pub(crate) async fn query_sample<R: Rng>(
    context: &Arc<dyn VotingContext>,
    txs: Vec<TxId>,
    k: usize,
    peers: Vec<NodeId>,
    rng: &mut R,
) -> HashMap<TxId, VoteRatio> {
    if txs.is_empty() {
        return HashMap::new();
    }
    if peers.is_empty() {
        debug!("no known peers; skipping the sampling phase this round");
        counter!(FPC_EMPTY_PEER_SET_ROUNDS).increment(1);
        return HashMap::new();
    }

    let txs: Arc<[TxId]> = txs.into();
    let selected = choose_with_replacement(&peers, k, rng);
    let mut queries: FuturesUnordered<_> = selected
        .into_iter()
        .map(|node| {
            let txs = txs.clone();
            async move { context.query_opinions(node, txs).await }
        })
        .collect();

    let mut likes = vec![0usize; txs.len()];
    let mut replies = vec![0usize; txs.len()];
    while let Some(opinions) = queries.next().await {
        if opinions.is_empty() {
            counter!(FPC_QUERY_FAILURES).increment(1);
            continue;
        }
        if opinions.len() != txs.len() {
            warn!(
                expected = txs.len(),
                received = opinions.len(),
                "misaligned opinion reply; dropped"
            );
            counter!(FPC_QUERY_FAILURES).increment(1);
            continue;
        }
        for (index, opinion) in opinions.iter().enumerate() {
            replies[index] += 1;
            if opinion.is_like() {
                likes[index] += 1;
            }
        }
    }

    let mut etas = HashMap::new();
    for (index, tx) in txs.iter().enumerate() {
        if replies[index] == 0 {
            continue;
        }
        let ratio = likes[index] as f64 / replies[index] as f64;
        etas.insert(tx.clone(), VoteRatio { ratio, count: replies[index] });
    }
    etas
}

/// Draws `k` node ids uniformly at random, with replacement. Sampling the
/// peer population i.i.d. is part of the protocol; duplicates are expected.
fn choose_with_replacement<R: Rng>(peers: &[NodeId], k: usize, rng: &mut R) -> Vec<NodeId> {
    (0..k).map(|_| peers[rng.gen_range(0..peers.len())].clone()).collect()
}
