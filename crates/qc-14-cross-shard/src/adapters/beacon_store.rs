//! In-Memory Beacon Store Adapter
//!
//! Implements `BeaconChainStore` over process memory for tests and
//! single-process simulation. Beacon blocks are kept in their JSON encoding,
//! the same bytes a persistent store would return.

use crate::domain::{BeaconBlock, CrossShardBlock, CrossShardError, Hash, Result, ShardId};
use crate::ports::outbound::BeaconChainStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Key of a stored incoming cross-shard block.
pub type IncomingKey = (ShardId, ShardId, u64);

/// In-memory beacon chain and cross-shard block store.
#[derive(Default)]
pub struct InMemoryBeaconStore {
    /// Beacon block hash by height.
    heights: RwLock<BTreeMap<u64, Hash>>,
    /// Encoded beacon block by hash.
    blocks: RwLock<HashMap<Hash, Vec<u8>>>,
    /// (receiving shard, sending shard, height) -> block.
    incoming: RwLock<BTreeMap<IncomingKey, CrossShardBlock>>,
    /// Key of every store call, in call order.
    store_log: RwLock<Vec<IncomingKey>>,
}

impl InMemoryBeaconStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a beacon block, indexed by its header height and hash.
    pub fn insert_beacon_block(&self, block: &BeaconBlock) -> Result<()> {
        let encoded = serde_json::to_vec(block)?;
        self.insert_raw(block.header.height, block.header.hash, encoded);
        Ok(())
    }

    /// Insert pre-encoded bytes under `height` and `hash`.
    pub fn insert_raw(&self, height: u64, hash: Hash, encoded: Vec<u8>) {
        self.heights.write().insert(height, hash);
        self.blocks.write().insert(hash, encoded);
    }

    /// Stored incoming block, if any.
    pub fn incoming(
        &self,
        receiving_shard: ShardId,
        sending_shard: ShardId,
        height: u64,
    ) -> Option<CrossShardBlock> {
        self.incoming
            .read()
            .get(&(receiving_shard, sending_shard, height))
            .cloned()
    }

    /// Keys of every store call, in call order.
    pub fn store_log(&self) -> Vec<IncomingKey> {
        self.store_log.read().clone()
    }
}

#[async_trait]
impl BeaconChainStore for InMemoryBeaconStore {
    async fn get_beacon_block_hash_by_height(&self, height: u64) -> Result<Hash> {
        self.heights
            .read()
            .get(&height)
            .copied()
            .ok_or_else(|| CrossShardError::Storage(format!("no beacon block at height {}", height)))
    }

    async fn fetch_beacon_block(&self, hash: &Hash) -> Result<Vec<u8>> {
        self.blocks
            .read()
            .get(hash)
            .cloned()
            .ok_or_else(|| CrossShardError::Storage(format!("unknown beacon block {}", hash)))
    }

    async fn store_incoming_cross_shard(
        &self,
        receiving_shard: ShardId,
        sending_shard: ShardId,
        height: u64,
        block: &CrossShardBlock,
    ) -> Result<()> {
        debug!(
            "[qc-14] Storing cross-shard block {} -> {} at height {}",
            sending_shard, receiving_shard, height
        );

        let key = (receiving_shard, sending_shard, height);
        self.incoming.write().insert(key, block.clone());
        self.store_log.write().push(key);
        Ok(())
    }
}
