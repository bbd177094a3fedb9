//! # Domain Invariants
//!
//! Rules that must hold for every commitment and committee transition.

use super::errors::{CrossShardError, Result};
use std::collections::BTreeSet;

/// Maximum shard count (one routing byte).
pub const MAX_SHARD_COUNT: u16 = 256;

/// Default network shard count.
pub const DEFAULT_SHARD_COUNT: u16 = 8;

/// Default committee size per shard.
pub const DEFAULT_COMMITTEE_SIZE: usize = 4;

/// Default number of validators rotated per swap.
pub const DEFAULT_SWAP_OFFSET: usize = 1;

/// Invariant: shard count is a power of two within `1..=MAX_SHARD_COUNT`.
///
/// Tree pairing halves every level exactly, so any other count misaligns.
pub fn invariant_power_of_two_shards(shard_count: u16) -> Result<()> {
    if shard_count == 0 || shard_count > MAX_SHARD_COUNT || !shard_count.is_power_of_two() {
        return Err(CrossShardError::ConfigError(format!(
            "shard count must be a power of two in 1..={MAX_SHARD_COUNT}, got {shard_count}"
        )));
    }
    Ok(())
}

/// Invariant: a flattened tree over `leaf_count` leaves holds `2N - 1` nodes.
pub fn invariant_layer_length(layer_len: usize, leaf_count: usize) -> bool {
    leaf_count > 0 && layer_len == 2 * leaf_count - 1
}

/// Invariant: committee after a swap has the configured size.
pub fn invariant_committee_size(committee: &[String], committee_size: usize) -> bool {
    committee.len() == committee_size
}

/// Invariant: a swap only moves members, it never invents or loses them.
///
/// - kept ∪ promoted = resulting committee
/// - evicted ∪ kept = original committee
pub fn invariant_swap_conservation(
    original: &[String],
    resulting: &[String],
    promoted: &[String],
    evicted: &[String],
) -> bool {
    let original: BTreeSet<&String> = original.iter().collect();
    let resulting: BTreeSet<&String> = resulting.iter().collect();
    let evicted: BTreeSet<&String> = evicted.iter().collect();
    let kept: BTreeSet<&String> = original.difference(&evicted).copied().collect();

    let mut rebuilt = kept.clone();
    rebuilt.extend(promoted.iter());

    let mut restored = kept;
    restored.extend(evicted.iter().copied());

    rebuilt == resulting && restored == original
}
