//! # Cross-Shard Configuration
//!
//! Network parameters threaded through the accumulator, tree builder and
//! instruction builder. Fixed for the lifetime of a network.

use crate::domain::{
    CrossShardError, Result, ShardCount, DEFAULT_COMMITTEE_SIZE, DEFAULT_SHARD_COUNT,
    DEFAULT_SWAP_OFFSET,
};
use serde::{Deserialize, Serialize};

/// Cross-shard subsystem configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrossShardConfig {
    /// Total number of shards. Power of two.
    pub shard_count: ShardCount,

    /// Target committee size per shard.
    pub committee_size: usize,

    /// Validators rotated per swap instruction.
    pub swap_offset: usize,

    /// Whether privacy-token outputs participate in the committed
    /// cross-shard root. Both producer and verifier must agree.
    #[serde(default)]
    pub include_privacy_token_outputs: bool,
}

impl Default for CrossShardConfig {
    fn default() -> Self {
        Self {
            shard_count: ShardCount::new_unchecked(DEFAULT_SHARD_COUNT),
            committee_size: DEFAULT_COMMITTEE_SIZE,
            swap_offset: DEFAULT_SWAP_OFFSET,
            include_privacy_token_outputs: false,
        }
    }
}

impl CrossShardConfig {
    /// Create config for testing (four shards).
    pub fn for_testing() -> Self {
        Self {
            shard_count: ShardCount::new_unchecked(4),
            committee_size: 3,
            swap_offset: 1,
            include_privacy_token_outputs: false,
        }
    }

    /// Parse from JSON and validate.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.committee_size == 0 {
            return Err(CrossShardError::ConfigError(
                "committee size must be positive".to_string(),
            ));
        }
        if self.swap_offset == 0 {
            return Err(CrossShardError::ConfigError(
                "swap offset must be positive".to_string(),
            ));
        }
        if self.swap_offset > self.committee_size {
            return Err(CrossShardError::ConfigError(format!(
                "swap offset {} exceeds committee size {}",
                self.swap_offset, self.committee_size
            )));
        }
        Ok(())
    }
}
