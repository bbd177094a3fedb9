//! # Algorithms Module
//!
//! Core algorithms of the cross-shard subsystem: routing, per-shard
//! commitment, the Merkle tree over shard digests, receiving-side
//! verification and instruction building.

pub mod accumulator;
pub mod digest;
pub mod instructions;
pub mod merkle;
pub mod shard_router;
pub mod verifier;

pub use accumulator::{CrossShardAccumulator, ShardOutbox};
pub use digest::{
    canonical_token_order, empty_shard_digest, output_coins_digest, shard_digest,
    token_data_digest,
};
pub use instructions::{
    encode_public_key, extract_assign_for_shard, InstructionBuilder, SwapOutcome,
    PUBLIC_KEY_VERSION,
};
pub use merkle::{
    create_shard_tx_root, merkle_root_of_hashes, MerkleLayer, MerkleLayout, MerkleProof,
    MerkleTreeBuilder,
};
pub use shard_router::ShardRouter;
pub use verifier::{
    create_merkle_cross_output_coin, verify_merkle_cross_output_coin, verify_merkle_path,
    CrossShardVerifier,
};
