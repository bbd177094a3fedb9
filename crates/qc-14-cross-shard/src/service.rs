//! Cross-Shard Service Implementation
//!
//! Wires the accumulator, tree builder, verifier and instruction builder from
//! one `CrossShardConfig` and exposes them through `CrossShardApi`.

use crate::adapters::{FifoCommitteeRotation, NoStabilityInstructions};
use crate::algorithms::{
    create_shard_tx_root, CrossShardAccumulator, CrossShardVerifier, InstructionBuilder,
    MerkleLayer, MerkleProof, MerkleTreeBuilder, SwapOutcome,
};
use crate::config::CrossShardConfig;
use crate::domain::{
    BeaconBlock, CrossShardBlock, CrossShardError, CrossShardHeader, Instruction, PaymentAddress,
    Result, ShardDigestRow, ShardId, Transaction, VerificationOutcome,
};
use crate::ports::{
    BeaconChainStore, CommitteeRotation, CrossShardApi, StabilityInstructionSource,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Load beacon blocks `from..=to` in height order.
///
/// Stops at the first missing height or undecodable block. An empty range
/// (`from > to`) yields no blocks.
pub async fn fetch_beacon_blocks_from_height(
    store: &dyn BeaconChainStore,
    from: u64,
    to: u64,
) -> Result<Vec<BeaconBlock>> {
    let mut blocks = Vec::new();
    for height in from..=to {
        let hash = store.get_beacon_block_hash_by_height(height).await?;
        let bytes = store.fetch_beacon_block(&hash).await?;
        let block: BeaconBlock = serde_json::from_slice(&bytes)?;
        blocks.push(block);
    }

    debug!(
        "[qc-14] Fetched {} beacon blocks from height {} to {}",
        blocks.len(),
        from,
        to
    );
    Ok(blocks)
}

/// Persist every cross-shard block received at `height`, senders ascending.
pub async fn store_incoming_cross_shard(
    store: &dyn BeaconChainStore,
    receiving_shard: ShardId,
    height: u64,
    incoming: &BTreeMap<ShardId, Vec<CrossShardBlock>>,
) -> Result<()> {
    for (sending_shard, blocks) in incoming {
        for block in blocks {
            store
                .store_incoming_cross_shard(receiving_shard, *sending_shard, height, block)
                .await?;
        }
    }
    Ok(())
}

/// Cross-shard subsystem facade.
pub struct CrossShardService<R = FifoCommitteeRotation, S = NoStabilityInstructions> {
    config: CrossShardConfig,
    accumulator: CrossShardAccumulator,
    tree_builder: MerkleTreeBuilder,
    verifier: CrossShardVerifier,
    instructions: InstructionBuilder<R, S>,
    store: Arc<dyn BeaconChainStore>,
}

impl CrossShardService {
    /// Create a service with the reference rotation and no stability source.
    pub fn new(config: CrossShardConfig, store: Arc<dyn BeaconChainStore>) -> Result<Self> {
        Self::with_collaborators(
            config,
            store,
            FifoCommitteeRotation,
            NoStabilityInstructions,
        )
    }
}

impl<R: CommitteeRotation, S: StabilityInstructionSource> CrossShardService<R, S> {
    /// Create a service over explicit rotation and stability collaborators.
    pub fn with_collaborators(
        config: CrossShardConfig,
        store: Arc<dyn BeaconChainStore>,
        rotation: R,
        stability: S,
    ) -> Result<Self> {
        config.validate()?;

        info!("[qc-14] Initializing Cross-Shard Service");
        info!("  Shard Count: {}", config.shard_count.get());
        info!("  Committee Size: {}", config.committee_size);
        info!("  Swap Offset: {}", config.swap_offset);
        info!(
            "  Privacy Token Outputs: {}",
            config.include_privacy_token_outputs
        );

        Ok(Self {
            accumulator: CrossShardAccumulator::from_config(&config),
            tree_builder: MerkleTreeBuilder::new(config.shard_count),
            verifier: CrossShardVerifier::from_config(&config),
            instructions: InstructionBuilder::new(rotation, stability),
            store,
            config,
        })
    }

    /// Underlying accumulator.
    pub fn accumulator(&self) -> &CrossShardAccumulator {
        &self.accumulator
    }

    /// Underlying verifier.
    pub fn verifier(&self) -> &CrossShardVerifier {
        &self.verifier
    }
}

#[async_trait]
impl<R: CommitteeRotation, S: StabilityInstructionSource> CrossShardApi for CrossShardService<R, S> {
    fn commit(&self, transactions: &[Transaction]) -> ShardDigestRow {
        self.accumulator.commit(transactions)
    }

    fn create_shard_tx_root(
        &self,
        transactions: &[Transaction],
    ) -> Result<(ShardDigestRow, MerkleLayer)> {
        create_shard_tx_root(&self.accumulator, &self.tree_builder, transactions)
    }

    fn proof_for(&self, layer: &MerkleLayer, shard_id: ShardId) -> Result<MerkleProof> {
        self.tree_builder.proof_for(layer, shard_id)
    }

    fn outgoing_block(
        &self,
        transactions: &[Transaction],
        from_shard: ShardId,
        to_shard: ShardId,
        height: u64,
    ) -> Result<CrossShardBlock> {
        let mut outboxes = self.accumulator.group(transactions);
        let shard_count = outboxes.len();
        if to_shard as usize >= shard_count {
            return Err(CrossShardError::UnknownShard {
                shard_id: to_shard as usize,
                shard_count,
            });
        }
        let layer = self
            .tree_builder
            .build(&self.accumulator.digest_row(&outboxes))?;
        let outbox = outboxes.swap_remove(to_shard as usize);
        Ok(outbox.into_cross_shard_block(CrossShardHeader {
            from_shard,
            to_shard,
            height,
            shard_tx_root: layer.root(),
        }))
    }

    fn destination_shards(&self, transactions: &[Transaction], from_shard: ShardId) -> Vec<ShardId> {
        self.accumulator.destination_shards(transactions, from_shard)
    }

    fn verify_incoming(
        &self,
        payload: &CrossShardBlock,
        proof: &MerkleProof,
    ) -> VerificationOutcome {
        self.verifier.verify_against_header(payload, proof)
    }

    fn build_instructions(
        &self,
        transactions: &[Transaction],
        shard_id: ShardId,
        producer_address: &PaymentAddress,
        block_height: u64,
        beacon_blocks: &[BeaconBlock],
    ) -> Result<Vec<Instruction>> {
        self.instructions.build_from_transactions(
            transactions,
            shard_id,
            producer_address,
            block_height,
            beacon_blocks,
        )
    }

    fn build_swap(
        &self,
        pending: &[String],
        committee: &[String],
        shard_id: ShardId,
    ) -> Result<SwapOutcome> {
        self.instructions.build_swap(
            pending,
            committee,
            self.config.committee_size,
            self.config.swap_offset,
            shard_id,
        )
    }

    async fn fetch_beacon_blocks_from_height(
        &self,
        from: u64,
        to: u64,
    ) -> Result<Vec<BeaconBlock>> {
        fetch_beacon_blocks_from_height(self.store.as_ref(), from, to).await
    }

    async fn store_incoming_cross_shard(
        &self,
        receiving_shard: ShardId,
        height: u64,
        incoming: &BTreeMap<ShardId, Vec<CrossShardBlock>>,
    ) -> Result<()> {
        store_incoming_cross_shard(self.store.as_ref(), receiving_shard, height, incoming).await
    }

    fn config(&self) -> &CrossShardConfig {
        &self.config
    }
}
