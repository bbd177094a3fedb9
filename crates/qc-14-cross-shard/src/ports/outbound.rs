//! # Outbound Ports
//!
//! Traits for external collaborators: beacon/cross-shard storage, committee
//! rotation policy, and the stability (governance) instruction builder.

use crate::domain::{
    BeaconBlock, CrossShardBlock, Hash, Instruction, PaymentAddress, Result, ShardId,
    Transaction,
};
use async_trait::async_trait;

/// Storage collaborator - outbound port.
///
/// Byte encoding of stored beacon blocks is opaque beyond being JSON-decodable
/// into [`BeaconBlock`].
#[async_trait]
pub trait BeaconChainStore: Send + Sync {
    /// Hash of the beacon block at `height`.
    async fn get_beacon_block_hash_by_height(&self, height: u64) -> Result<Hash>;

    /// Encoded beacon block by hash.
    async fn fetch_beacon_block(&self, hash: &Hash) -> Result<Vec<u8>>;

    /// Persist a cross-shard block received by `receiving_shard`.
    async fn store_incoming_cross_shard(
        &self,
        receiving_shard: ShardId,
        sending_shard: ShardId,
        height: u64,
        block: &CrossShardBlock,
    ) -> Result<()>;
}

/// Result of one committee rotation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RotationResult {
    /// Pending queue after promotion.
    pub pending: Vec<String>,
    /// Committee after the swap.
    pub committee: Vec<String>,
    /// Members that left the committee.
    pub evicted: Vec<String>,
    /// Members that joined the committee.
    pub promoted: Vec<String>,
}

/// Committee rotation policy - outbound port.
///
/// Consumed as a black box; its errors are fatal to the block build.
pub trait CommitteeRotation: Send + Sync {
    /// Promote from `pending` into `committee`, evicting as the policy decides.
    fn swap(
        &self,
        pending: &[String],
        committee: &[String],
        committee_size: usize,
        offset: usize,
    ) -> Result<RotationResult>;
}

/// Inputs of a shard block's instruction build.
#[derive(Clone, Copy, Debug)]
pub struct ShardBlockContext<'a> {
    /// Block transactions.
    pub transactions: &'a [Transaction],
    /// Producing shard.
    pub shard_id: ShardId,
    /// Block producer.
    pub producer_address: &'a PaymentAddress,
    /// Block height.
    pub block_height: u64,
    /// Beacon blocks visible to this shard block.
    pub beacon_blocks: &'a [BeaconBlock],
}

/// Stability/governance instruction builder - outbound port.
pub trait StabilityInstructionSource: Send + Sync {
    /// Instructions derived from governance metadata, emitted before stake
    /// instructions.
    fn build_stability_instructions(&self, ctx: &ShardBlockContext<'_>) -> Result<Vec<Instruction>>;
}
