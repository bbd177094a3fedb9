//! # Domain Value Objects
//!
//! Immutable value types for cross-shard commitments.

use super::errors::{CrossShardError, Result, ShardId};
use super::invariants::invariant_power_of_two_shards;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Digest size in bytes.
pub const HASH_SIZE: usize = 32;

/// Fixed-size SHA-256 digest.
///
/// The canonical string is the lowercase hex of the bytes in reversed order,
/// the usual chain-hash presentation. Ordering follows the canonical string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Wrap raw digest bytes.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build from a slice, which must be exactly [`HASH_SIZE`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; HASH_SIZE] =
            bytes
                .try_into()
                .map_err(|_| CrossShardError::InvalidHashLength {
                    expected: HASH_SIZE,
                    got: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// `H(data)`.
    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut output = [0u8; HASH_SIZE];
        output.copy_from_slice(&result);
        Self(output)
    }

    /// `H(left || right)`.
    pub fn concat(left: &Hash, right: &Hash) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(left.0);
        hasher.update(right.0);
        let result = hasher.finalize();
        let mut output = [0u8; HASH_SIZE];
        output.copy_from_slice(&result);
        Self(output)
    }

    /// `H("")`, the digest of a shard with no traffic of a given kind.
    pub fn empty() -> Self {
        Self::digest(&[])
    }

    /// Zero-value digest, `H([0x00])`, root of an empty hash list.
    pub fn zero_value() -> Self {
        Self::digest(&[0u8])
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        f.write_str(&hex::encode(reversed))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({self})")
    }
}

impl FromStr for Hash {
    type Err = CrossShardError;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = hex::decode(s)?;
        bytes.reverse();
        Self::from_slice(&bytes)
    }
}

impl Ord for Hash {
    // Comparing reversed bytes is equivalent to comparing the canonical strings.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

impl PartialOrd for Hash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Network-wide shard count: a power of two in `1..=MAX_SHARD_COUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ShardCount(u16);

impl ShardCount {
    /// Validate a shard count.
    pub fn new(count: u16) -> Result<Self> {
        invariant_power_of_two_shards(count)?;
        Ok(Self(count))
    }

    /// Caller guarantees `count` is a power of two within range.
    pub(crate) const fn new_unchecked(count: u16) -> Self {
        Self(count)
    }

    /// Count as `usize`.
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Number of tree levels above the leaves, `log2(count)`.
    pub fn depth(self) -> usize {
        self.0.trailing_zeros() as usize
    }

    /// Iterate all shard ids in index order.
    pub fn shard_ids(self) -> impl Iterator<Item = ShardId> {
        // count <= 256 so every index fits a u8
        (0..self.0).map(|i| i as ShardId)
    }
}

impl TryFrom<u16> for ShardCount {
    type Error = CrossShardError;

    fn try_from(value: u16) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ShardCount> for u16 {
    fn from(count: ShardCount) -> Self {
        count.0
    }
}

/// Instruction action tags.
pub const ASSIGN_ACTION: &str = "assign";
/// Swap tag.
pub const SWAP_ACTION: &str = "swap";
/// Stake tag.
pub const STAKE_ACTION: &str = "stake";

/// Chain a stake or assignment applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainRole {
    /// Shard committee.
    Shard,
    /// Beacon committee.
    Beacon,
}

impl ChainRole {
    /// Wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shard => "shard",
            Self::Beacon => "beacon",
        }
    }
}

/// Control instruction: an ordered list of strings, tag first.
///
/// The wire form is a JSON array of strings and must reproduce exactly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instruction(Vec<String>);

impl Instruction {
    /// Wrap raw fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    /// `["stake", k1,k2,.., role]`.
    pub fn stake(keys: &[String], role: ChainRole) -> Self {
        Self(vec![
            STAKE_ACTION.to_string(),
            keys.join(","),
            role.as_str().to_string(),
        ])
    }

    /// `["swap", promoted, evicted, "shard", shard_id]`.
    pub fn swap(promoted: &[String], evicted: &[String], shard_id: ShardId) -> Self {
        Self(vec![
            SWAP_ACTION.to_string(),
            promoted.join(","),
            evicted.join(","),
            ChainRole::Shard.as_str().to_string(),
            shard_id.to_string(),
        ])
    }

    /// All fields.
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Action tag.
    pub fn tag(&self) -> Option<&str> {
        self.field(0)
    }

    /// True for `["assign", _, "shard", shard_id, ..]`.
    pub fn is_shard_assignment_for(&self, shard_id: ShardId) -> bool {
        self.tag() == Some(ASSIGN_ACTION)
            && self.field(2) == Some(ChainRole::Shard.as_str())
            && self.field(3) == Some(shard_id.to_string().as_str())
    }

    /// Consume into fields.
    pub fn into_fields(self) -> Vec<String> {
        self.0
    }
}

/// Result of an inclusion check with failure locality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Payload is committed under the proof root.
    Valid,
    /// Payload leaf differs from the leaf the proof was issued for.
    LeafMismatch,
    /// Sibling path does not fit the receiver position or the tree depth.
    PathMismatch {
        /// First level where the path diverges
        level: usize,
    },
    /// Path replay does not reach the declared root.
    RootMismatch,
}

impl VerificationOutcome {
    /// Boolean summary.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl From<VerificationOutcome> for bool {
    fn from(outcome: VerificationOutcome) -> Self {
        outcome.is_valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_from_slice_wrong_length() {
        let result = Hash::from_slice(&[0u8; 31]);
        assert!(matches!(
            result,
            Err(CrossShardError::InvalidHashLength {
                expected: 32,
                got: 31
            })
        ));
    }

    #[test]
    fn test_hash_string_is_reversed_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let hash = Hash::new(bytes);
        let s = hash.to_string();
        assert_eq!(s.len(), 64);
        assert!(s.ends_with("ab"));
        assert_eq!(s.parse::<Hash>().unwrap(), hash);
    }

    #[test]
    fn test_hash_ordering_follows_string() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        a[0] = 0xff; // low-order byte in the canonical string
        b[31] = 0x01;
        let (a, b) = (Hash::new(a), Hash::new(b));
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_empty_hash_is_sha256_of_nothing() {
        assert_eq!(
            hex::encode(Hash::empty().as_bytes()),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash_serde_as_string() {
        let hash = Hash::digest(b"qc-14");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_shard_count_power_of_two() {
        assert!(ShardCount::new(1).is_ok());
        assert!(ShardCount::new(4).is_ok());
        assert!(ShardCount::new(256).is_ok());
        assert!(ShardCount::new(0).is_err());
        assert!(ShardCount::new(6).is_err());
        assert!(ShardCount::new(512).is_err());
    }

    #[test]
    fn test_shard_count_depth() {
        assert_eq!(ShardCount::new(1).unwrap().depth(), 0);
        assert_eq!(ShardCount::new(8).unwrap().depth(), 3);
        assert_eq!(ShardCount::new(256).unwrap().shard_ids().count(), 256);
    }

    #[test]
    fn test_stake_instruction_wire_format() {
        let keys = vec!["k1".to_string(), "k2".to_string()];
        let ins = Instruction::stake(&keys, ChainRole::Beacon);
        assert_eq!(ins.fields(), &["stake", "k1,k2", "beacon"]);
        assert_eq!(
            serde_json::to_string(&ins).unwrap(),
            r#"["stake","k1,k2","beacon"]"#
        );
    }

    #[test]
    fn test_swap_instruction_wire_format() {
        let ins = Instruction::swap(&["a".to_string()], &["b".to_string(), "c".to_string()], 3);
        assert_eq!(ins.fields(), &["swap", "a", "b,c", "shard", "3"]);
        assert_eq!(ins.into_fields()[4], "3");
    }

    #[test]
    fn test_assignment_match() {
        let ins = Instruction::new(
            ["assign", "x,y", "shard", "12"].iter().map(|s| s.to_string()).collect(),
        );
        assert!(ins.is_shard_assignment_for(12));
        assert!(!ins.is_shard_assignment_for(1));
        assert!(!Instruction::new(vec!["assign".to_string()]).is_shard_assignment_for(0));
    }

    #[test]
    fn test_outcome_bool_coercion() {
        assert!(bool::from(VerificationOutcome::Valid));
        assert!(!VerificationOutcome::RootMismatch.is_valid());
        assert!(!VerificationOutcome::PathMismatch { level: 1 }.is_valid());
    }
}
