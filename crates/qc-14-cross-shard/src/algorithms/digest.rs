//! # Shard Digest Helpers
//!
//! The per-shard leaf computation shared by the sending side (accumulator)
//! and the receiving side (verifier). Both must produce identical bytes,
//! including for shards that received nothing:
//!
//! ```text
//! output = H(coin_0 || coin_1 || ..)            or H("") when empty
//! token  = H(H(bucket_0) || H(bucket_1) || ..)  buckets sorted by id string,
//!                                               or H("") when empty
//! leaf   = H(output || token)
//! ```

use crate::domain::{Hash, OutputCoin, TxTokenData};

/// Digest of the output coins routed to one shard.
pub fn output_coins_digest(coins: &[OutputCoin]) -> Hash {
    if coins.is_empty() {
        return Hash::empty();
    }
    let mut data = Vec::new();
    for coin in coins {
        data.extend_from_slice(&coin.to_bytes());
    }
    Hash::digest(&data)
}

/// Sort token buckets by the canonical string of their token id.
///
/// Aggregation order depends on transaction order; hashing must not.
pub fn canonical_token_order(buckets: &mut [TxTokenData]) {
    buckets.sort_by_cached_key(|bucket| bucket.property_id.to_string());
}

/// Digest of the token buckets routed to one shard.
pub fn token_data_digest(buckets: &[TxTokenData]) -> Hash {
    if buckets.is_empty() {
        return Hash::empty();
    }
    let mut ordered = buckets.to_vec();
    canonical_token_order(&mut ordered);

    let mut data = Vec::with_capacity(ordered.len() * 32);
    for bucket in &ordered {
        data.extend_from_slice(bucket.hash().as_bytes());
    }
    Hash::digest(&data)
}

/// Leaf digest of one shard.
pub fn shard_digest(coins: &[OutputCoin], buckets: &[TxTokenData]) -> Hash {
    Hash::concat(&output_coins_digest(coins), &token_data_digest(buckets))
}

/// Leaf digest of a shard with no traffic, `H(H("") || H(""))`.
pub fn empty_shard_digest() -> Hash {
    Hash::concat(&Hash::empty(), &Hash::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(id: &[u8]) -> TxTokenData {
        TxTokenData {
            property_id: Hash::digest(id),
            property_name: "T".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_shard_digest() {
        assert_eq!(shard_digest(&[], &[]), empty_shard_digest());
        assert_eq!(
            empty_shard_digest(),
            Hash::concat(&Hash::digest(b""), &Hash::digest(b""))
        );
    }

    #[test]
    fn test_output_digest_is_order_sensitive() {
        let a = OutputCoin {
            public_key: vec![1],
            value: 1,
            ..Default::default()
        };
        let b = OutputCoin {
            public_key: vec![2],
            value: 2,
            ..Default::default()
        };
        assert_ne!(
            output_coins_digest(&[a.clone(), b.clone()]),
            output_coins_digest(&[b, a])
        );
    }

    #[test]
    fn test_token_digest_is_order_independent() {
        let x = bucket(b"x");
        let y = bucket(b"y");
        assert_eq!(
            token_data_digest(&[x.clone(), y.clone()]),
            token_data_digest(&[y, x])
        );
    }

    #[test]
    fn test_canonical_order_sorts_by_string() {
        let mut buckets = vec![bucket(b"a"), bucket(b"b"), bucket(b"c")];
        canonical_token_order(&mut buckets);
        let ids: Vec<String> = buckets.iter().map(|b| b.property_id.to_string()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
