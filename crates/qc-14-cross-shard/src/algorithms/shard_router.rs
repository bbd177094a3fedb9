//! # Shard Routing
//!
//! Deterministic mapping from an address fragment (the last byte of a
//! receiver's public key) to its destination shard.

use crate::domain::{ShardCount, ShardId};

/// Routes address fragments into `[0, shard_count)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShardRouter {
    shard_count: ShardCount,
}

impl ShardRouter {
    /// Create a router for a network of `shard_count` shards.
    pub fn new(shard_count: ShardCount) -> Self {
        Self { shard_count }
    }

    /// Destination shard of an address fragment.
    #[inline]
    pub fn route(&self, fragment: u8) -> ShardId {
        // shard_count <= 256, so the remainder always fits a ShardId
        (fragment as usize % self.shard_count.get()) as ShardId
    }

    /// Shard count this router reduces into.
    pub fn shard_count(&self) -> ShardCount {
        self.shard_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn router(n: u16) -> ShardRouter {
        ShardRouter::new(ShardCount::new(n).unwrap())
    }

    #[test]
    fn test_route_deterministic() {
        let r = router(8);
        assert_eq!(r.route(0x3f), r.route(0x3f));
    }

    #[test]
    fn test_route_within_range() {
        let r = router(16);
        for b in 0..=u8::MAX {
            assert!((r.route(b) as usize) < 16);
        }
    }

    #[test]
    fn test_route_image_size_equals_shard_count() {
        for n in [1u16, 2, 4, 8, 64, 256] {
            let r = router(n);
            let image: BTreeSet<ShardId> = (0..=u8::MAX).map(|b| r.route(b)).collect();
            assert_eq!(image.len(), n as usize);
        }
    }

    #[test]
    fn test_route_full_range_is_identity() {
        let r = router(256);
        assert_eq!(r.route(200), 200);
    }
}
