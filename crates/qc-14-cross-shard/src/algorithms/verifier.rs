//! # Cross-Shard Verification
//!
//! Receiving-side check that an incoming payload is exactly the one the
//! sending shard committed.
//!
//! # Algorithm
//!
//! 1. Recompute the payload leaf with the same helpers the accumulator uses
//! 2. Replay the path: for even index `current = H(current || sibling)`,
//!    for odd index `current = H(sibling || current)`, then `index /= 2`
//! 3. Accept iff the result equals the proof root
//!
//! A mismatch is an outcome, not an error.

use super::digest::shard_digest;
use super::merkle::{merkle_root_of_hashes, MerkleProof};
use crate::config::CrossShardConfig;
use crate::domain::{
    CrossOutputCoin, CrossShardBlock, Hash, ShardCount, ShardId, VerificationOutcome,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Replay a sibling path from `leaf` and compare with `root`.
///
/// # Time Complexity: O(log n)
pub fn verify_merkle_path(leaf: Hash, siblings: &[Hash], root: &Hash, index: ShardId) -> bool {
    replay_path(leaf, siblings, index) == *root
}

fn replay_path(leaf: Hash, siblings: &[Hash], index: ShardId) -> Hash {
    let mut current = leaf;
    let mut i = index as usize;
    for sibling in siblings {
        current = if i % 2 == 0 {
            Hash::concat(&current, sibling)
        } else {
            Hash::concat(sibling, &current)
        };
        i /= 2;
    }
    current
}

/// Verifies received cross-shard payloads against inclusion proofs.
#[derive(Clone, Debug)]
pub struct CrossShardVerifier {
    shard_count: ShardCount,
}

impl CrossShardVerifier {
    /// Create a verifier for `shard_count` shards.
    pub fn new(shard_count: ShardCount) -> Self {
        Self { shard_count }
    }

    /// Create from network configuration.
    pub fn from_config(config: &CrossShardConfig) -> Self {
        Self::new(config.shard_count)
    }

    /// Leaf digest of a received payload.
    pub fn leaf_digest(payload: &CrossShardBlock) -> Hash {
        shard_digest(&payload.cross_output_coins, &payload.cross_tx_token_data)
    }

    /// Accept/reject oracle.
    pub fn verify(
        &self,
        payload: &CrossShardBlock,
        proof: &MerkleProof,
        receiver: ShardId,
    ) -> bool {
        self.verify_detailed(payload, proof, receiver).is_valid()
    }

    /// Inclusion check with failure locality.
    pub fn verify_detailed(
        &self,
        payload: &CrossShardBlock,
        proof: &MerkleProof,
        receiver: ShardId,
    ) -> VerificationOutcome {
        let leaf = Self::leaf_digest(payload);
        if verify_merkle_path(leaf, &proof.siblings, &proof.root, receiver) {
            debug!(
                "[qc-14] Cross-shard payload {} -> {} at height {} verified",
                payload.header.from_shard, receiver, payload.header.height
            );
            return VerificationOutcome::Valid;
        }

        let outcome = self.diagnose(leaf, proof, receiver);
        warn!(
            "[qc-14] Cross-shard payload {} -> {} at height {} rejected: {:?}",
            payload.header.from_shard, receiver, payload.header.height, outcome
        );
        outcome
    }

    /// Verify using the routing and root carried in the payload header.
    ///
    /// The header root must be the root the proof was issued under and the
    /// header receiver must be the shard the proof was issued for. Equal
    /// leaves (two empty shards) would otherwise replay to the same root.
    pub fn verify_against_header(
        &self,
        payload: &CrossShardBlock,
        proof: &MerkleProof,
    ) -> VerificationOutcome {
        if payload.header.to_shard != proof.shard_id {
            warn!(
                "[qc-14] Payload addressed to shard {} carries a proof for shard {}",
                payload.header.to_shard, proof.shard_id
            );
            return VerificationOutcome::PathMismatch { level: 0 };
        }
        if payload.header.shard_tx_root != proof.root {
            warn!(
                "[qc-14] Proof root {} differs from header root {}",
                proof.root, payload.header.shard_tx_root
            );
            return VerificationOutcome::RootMismatch;
        }
        self.verify_detailed(payload, proof, payload.header.to_shard)
    }

    fn diagnose(&self, leaf: Hash, proof: &MerkleProof, receiver: ShardId) -> VerificationOutcome {
        let depth = self.shard_count.depth();
        if proof.siblings.len() != depth {
            return VerificationOutcome::PathMismatch {
                level: proof.siblings.len().min(depth),
            };
        }
        if receiver as usize >= self.shard_count.get() || receiver != proof.shard_id {
            return VerificationOutcome::PathMismatch { level: 0 };
        }
        if leaf != proof.leaf {
            return VerificationOutcome::LeafMismatch;
        }
        VerificationOutcome::RootMismatch
    }
}

/// Root over every cross output coin a block received, by sending shard.
pub fn create_merkle_cross_output_coin(
    cross_output_coins: &BTreeMap<ShardId, Vec<CrossOutputCoin>>,
) -> Hash {
    // BTreeMap iterates senders in ascending shard order
    let hashes: Vec<Hash> = cross_output_coins
        .values()
        .flat_map(|coins| coins.iter().map(CrossOutputCoin::hash))
        .collect();
    merkle_root_of_hashes(&hashes)
}

/// Check received cross output coins against a committed root.
pub fn verify_merkle_cross_output_coin(
    cross_output_coins: &BTreeMap<ShardId, Vec<CrossOutputCoin>>,
    root: &Hash,
) -> bool {
    create_merkle_cross_output_coin(cross_output_coins) == *root
}
