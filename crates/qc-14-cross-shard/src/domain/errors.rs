//! # Domain Errors
//!
//! Error types for the cross-shard commitment subsystem.
//!
//! A failed inclusion check is not an error: verification reports it as
//! `false` or as a [`VerificationOutcome`](crate::domain::VerificationOutcome).

use thiserror::Error;

/// Shard identifier. Routing reduces a single address byte, so 256 shards max.
pub type ShardId = u8;

/// Result type alias for cross-shard operations.
pub type Result<T> = std::result::Result<T, CrossShardError>;

/// Cross-shard error types.
#[derive(Debug, Error)]
pub enum CrossShardError {
    /// Shard index outside `[0, shard_count)`.
    #[error("Unknown shard: {shard_id} (shard count {shard_count})")]
    UnknownShard {
        /// Requested shard
        shard_id: usize,
        /// Configured shard count
        shard_count: usize,
    },

    /// Hash constructed from a byte slice of the wrong length.
    #[error("Invalid hash length: expected {expected}, got {got}")]
    InvalidHashLength {
        /// Required length
        expected: usize,
        /// Supplied length
        got: usize,
    },

    /// Hash string is not valid hex.
    #[error("Invalid hash encoding: {0}")]
    InvalidHashEncoding(#[from] hex::FromHexError),

    /// Digest row does not carry one entry per shard.
    #[error("Digest row length {got} does not match shard count {expected}")]
    RowLength {
        /// Shard count
        expected: usize,
        /// Row length
        got: usize,
    },

    /// Stored block bytes could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Storage collaborator failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Committee rotation collaborator failure, propagated verbatim.
    #[error("Committee rotation failed: {0}")]
    Rotation(String),

    /// Staking transaction without an input coin to take the key from.
    #[error("Staking transaction {0} has no input coin")]
    MissingStakeInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_shard_error() {
        let err = CrossShardError::UnknownShard {
            shard_id: 9,
            shard_count: 8,
        };
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains('8'));
    }

    #[test]
    fn test_invalid_hash_length_error() {
        let err = CrossShardError::InvalidHashLength {
            expected: 32,
            got: 31,
        };
        assert!(err.to_string().contains("32"));
        assert!(err.to_string().contains("31"));
    }

    #[test]
    fn test_decode_error_wraps_json() {
        let json_err = serde_json::from_slice::<Vec<String>>(b"{").unwrap_err();
        let err: CrossShardError = json_err.into();
        assert!(matches!(err, CrossShardError::Decode(_)));
    }

    #[test]
    fn test_rotation_error_verbatim() {
        let err = CrossShardError::Rotation("offset is zero".to_string());
        assert!(err.to_string().contains("offset is zero"));
    }
}
