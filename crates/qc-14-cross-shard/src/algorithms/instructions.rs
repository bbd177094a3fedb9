//! # Shard Block Instructions
//!
//! Builds the stake, assign and swap control instructions a shard block
//! producer embeds in its block body.
//!
//! | Instruction | Fields |
//! |-------------|--------|
//! | stake | `["stake", k1,k2,.., "shard" \| "beacon"]` |
//! | swap | `["swap", promoted, evicted, "shard", shard_id]` |
//! | assign | `["assign", keys, "shard", shard_id]` (emitted by beacon) |

use crate::domain::{
    BeaconBlock, ChainRole, CrossShardError, Instruction, PaymentAddress, Result, ShardId,
    Transaction,
};
use crate::ports::outbound::{CommitteeRotation, ShardBlockContext, StabilityInstructionSource};
use tracing::{debug, info};

/// Version byte of Base58Check-encoded public keys.
pub const PUBLIC_KEY_VERSION: u8 = 0x00;

/// Swap instruction plus the committee state it produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapOutcome {
    /// `["swap", ..]` instruction.
    pub instruction: Instruction,
    /// Pending queue after the swap.
    pub pending: Vec<String>,
    /// Committee after the swap.
    pub committee: Vec<String>,
}

/// Base58Check encoding of a compressed public key.
pub fn encode_public_key(compressed: &[u8]) -> String {
    bs58::encode(compressed)
        .with_check_version(PUBLIC_KEY_VERSION)
        .into_string()
}

/// Every `["assign", _, "shard", shard_id, ..]` in beacon block order.
pub fn extract_assign_for_shard(beacon_blocks: &[BeaconBlock], shard_id: ShardId) -> Vec<Instruction> {
    beacon_blocks
        .iter()
        .flat_map(|block| block.body.instructions.iter())
        .filter(|ins| ins.is_shard_assignment_for(shard_id))
        .cloned()
        .collect()
}

/// Derives control instructions for shard block production.
pub struct InstructionBuilder<R, S> {
    rotation: R,
    stability: S,
}

impl<R: CommitteeRotation, S: StabilityInstructionSource> InstructionBuilder<R, S> {
    /// Create a builder over the given collaborators.
    pub fn new(rotation: R, stability: S) -> Self {
        Self {
            rotation,
            stability,
        }
    }

    /// Rotate a shard committee and wrap the result as a swap instruction.
    ///
    /// Successive calls for one shard must observe the previous call's
    /// output; callers serialize them.
    pub fn build_swap(
        &self,
        pending: &[String],
        committee: &[String],
        committee_size: usize,
        offset: usize,
        shard_id: ShardId,
    ) -> Result<SwapOutcome> {
        debug!(
            "[qc-14] Shard {} swap: {} pending, {} committee",
            shard_id,
            pending.len(),
            committee.len()
        );

        let rotated = self
            .rotation
            .swap(pending, committee, committee_size, offset)?;

        info!(
            "[qc-14] Shard {} swap: promoted {}, evicted {}",
            shard_id,
            rotated.promoted.len(),
            rotated.evicted.len()
        );

        Ok(SwapOutcome {
            instruction: Instruction::swap(&rotated.promoted, &rotated.evicted, shard_id),
            pending: rotated.pending,
            committee: rotated.committee,
        })
    }

    /// Stability instructions followed by shard and beacon stake instructions.
    pub fn build_from_transactions(
        &self,
        transactions: &[Transaction],
        shard_id: ShardId,
        producer_address: &PaymentAddress,
        block_height: u64,
        beacon_blocks: &[BeaconBlock],
    ) -> Result<Vec<Instruction>> {
        let ctx = ShardBlockContext {
            transactions,
            shard_id,
            producer_address,
            block_height,
            beacon_blocks,
        };
        let mut instructions = self.stability.build_stability_instructions(&ctx)?;

        let mut shard_stakers = Vec::new();
        let mut beacon_stakers = Vec::new();
        for tx in transactions {
            let Some(role) = tx.metadata_kind().stake_role() else {
                continue;
            };
            let key = tx
                .proof()
                .and_then(|proof| proof.input_coins.first())
                .map(|coin| encode_public_key(&coin.public_key))
                .ok_or_else(|| CrossShardError::MissingStakeInput(tx.tx_id().to_string()))?;
            match role {
                ChainRole::Shard => shard_stakers.push(key),
                ChainRole::Beacon => beacon_stakers.push(key),
            }
        }

        if !shard_stakers.is_empty() {
            instructions.push(Instruction::stake(&shard_stakers, ChainRole::Shard));
        }
        if !beacon_stakers.is_empty() {
            instructions.push(Instruction::stake(&beacon_stakers, ChainRole::Beacon));
        }

        debug!(
            "[qc-14] Shard {} height {}: {} instructions ({} shard stakers, {} beacon stakers)",
            shard_id,
            block_height,
            instructions.len(),
            shard_stakers.len(),
            beacon_stakers.len()
        );

        Ok(instructions)
    }
}
