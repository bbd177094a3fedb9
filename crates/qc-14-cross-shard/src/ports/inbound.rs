//! # Inbound Ports
//!
//! API trait defining what the cross-shard subsystem can do for a shard
//! block producer and a receiving shard.

use crate::algorithms::{MerkleLayer, MerkleProof, SwapOutcome};
use crate::config::CrossShardConfig;
use crate::domain::{
    BeaconBlock, CrossShardBlock, Instruction, PaymentAddress, Result, ShardDigestRow, ShardId,
    Transaction, VerificationOutcome,
};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Cross-shard commitment API - inbound port.
#[async_trait]
pub trait CrossShardApi: Send + Sync {
    /// Per-shard digest row of a block's transactions.
    fn commit(&self, transactions: &[Transaction]) -> ShardDigestRow;

    /// Digest row and Merkle tree committed in a shard block header.
    fn create_shard_tx_root(
        &self,
        transactions: &[Transaction],
    ) -> Result<(ShardDigestRow, MerkleLayer)>;

    /// Inclusion proof of `shard_id` in `layer`.
    fn proof_for(&self, layer: &MerkleLayer, shard_id: ShardId) -> Result<MerkleProof>;

    /// Outgoing cross-shard block for `to_shard`, header included.
    fn outgoing_block(
        &self,
        transactions: &[Transaction],
        from_shard: ShardId,
        to_shard: ShardId,
        height: u64,
    ) -> Result<CrossShardBlock>;

    /// Shards other than `from_shard` receiving any output.
    fn destination_shards(&self, transactions: &[Transaction], from_shard: ShardId) -> Vec<ShardId>;

    /// Check a received payload against its proof and header.
    fn verify_incoming(&self, payload: &CrossShardBlock, proof: &MerkleProof)
        -> VerificationOutcome;

    /// Control instructions of a shard block.
    fn build_instructions(
        &self,
        transactions: &[Transaction],
        shard_id: ShardId,
        producer_address: &PaymentAddress,
        block_height: u64,
        beacon_blocks: &[BeaconBlock],
    ) -> Result<Vec<Instruction>>;

    /// Rotate a shard committee with the configured size and offset.
    fn build_swap(
        &self,
        pending: &[String],
        committee: &[String],
        shard_id: ShardId,
    ) -> Result<SwapOutcome>;

    /// Beacon blocks `from..=to`, in height order.
    async fn fetch_beacon_blocks_from_height(&self, from: u64, to: u64)
        -> Result<Vec<BeaconBlock>>;

    /// Persist every cross-shard block received at `height`.
    async fn store_incoming_cross_shard(
        &self,
        receiving_shard: ShardId,
        height: u64,
        incoming: &BTreeMap<ShardId, Vec<CrossShardBlock>>,
    ) -> Result<()>;

    /// Current configuration.
    fn config(&self) -> &CrossShardConfig;
}
