use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;

use crate::types::{NodeId, Opinion, TxId, TxOpinion, VotingContext};

mock! {
    pub TestContext {}

    #[async_trait]
    impl VotingContext for TestContext {
        fn known_peers(&self) -> Vec<NodeId>;
        async fn query_opinions(&self, node: NodeId, txs: Arc<[TxId]>) -> Vec<Opinion>;
    }
}

pub fn tx_opinion(id: &str, opinion: Opinion) -> TxOpinion {
    TxOpinion { tx_id: TxId::from(id), opinion }
}

pub fn peers(count: usize) -> Vec<NodeId> {
    (0..count).map(|index| format!("node-{index}")).collect()
}
