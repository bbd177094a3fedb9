//! # Cross-Shard Accumulator
//!
//! Groups a block's outgoing transaction effects by destination shard and
//! reduces each group to one leaf digest.
//!
//! ## Algorithm
//!
//! 1. Route every output coin of a native proof to `route(pk_last_byte)`.
//! 2. Route every custom-token vout the same way and merge it into that
//!    shard's bucket for its token id. The first vout for a token inserts a
//!    metadata-only clone of the token data; later vouts append.
//! 3. Privacy-token transfers join step 1 only when the network enables
//!    `include_privacy_token_outputs`.
//! 4. Reduce each shard with [`shard_digest`], empty shards included.

use super::digest::{canonical_token_order, shard_digest};
use super::shard_router::ShardRouter;
use crate::config::CrossShardConfig;
use crate::domain::{
    CrossShardBlock, CrossShardError, CrossShardHeader, Hash, OutputCoin, Result, ShardCount,
    ShardDigestRow, ShardId, Transaction, TransactionProof, TxTokenData, TxTokenVout,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Everything one block sends to one destination shard.
#[derive(Clone, Debug, Default)]
pub struct ShardOutbox {
    output_coins: Vec<OutputCoin>,
    token_data: HashMap<Hash, TxTokenData>,
}

impl ShardOutbox {
    /// Output coins in transaction order.
    pub fn output_coins(&self) -> &[OutputCoin] {
        &self.output_coins
    }

    /// Token buckets in canonical order.
    pub fn token_buckets(&self) -> Vec<TxTokenData> {
        let mut buckets: Vec<TxTokenData> = self.token_data.values().cloned().collect();
        canonical_token_order(&mut buckets);
        buckets
    }

    /// True when nothing is routed here.
    pub fn is_empty(&self) -> bool {
        self.output_coins.is_empty() && self.token_data.is_empty()
    }

    /// Leaf digest of this shard.
    pub fn digest(&self) -> Hash {
        shard_digest(&self.output_coins, &self.token_buckets())
    }

    /// Package as the payload delivered to the destination shard.
    pub fn into_cross_shard_block(self, header: CrossShardHeader) -> CrossShardBlock {
        let cross_tx_token_data = self.token_buckets();
        CrossShardBlock {
            header,
            cross_output_coins: self.output_coins,
            cross_tx_token_data,
        }
    }

    fn merge_vout(&mut self, token: &TxTokenData, vout: &TxTokenVout) {
        let bucket = self
            .token_data
            .entry(token.property_id)
            .or_insert_with(|| token.clone_for_cross_shard());
        bucket.vouts.push(vout.clone());
    }
}

/// Per-shard commitment of a block's outgoing effects.
#[derive(Clone, Debug)]
pub struct CrossShardAccumulator {
    router: ShardRouter,
    include_privacy_token_outputs: bool,
}

impl CrossShardAccumulator {
    /// Create an accumulator for `shard_count` shards.
    pub fn new(shard_count: ShardCount, include_privacy_token_outputs: bool) -> Self {
        Self {
            router: ShardRouter::new(shard_count),
            include_privacy_token_outputs,
        }
    }

    /// Create from network configuration.
    pub fn from_config(config: &CrossShardConfig) -> Self {
        Self::new(config.shard_count, config.include_privacy_token_outputs)
    }

    /// Router used for every effect.
    pub fn router(&self) -> &ShardRouter {
        &self.router
    }

    /// Group effects into one outbox per shard, indexed by shard id.
    pub fn group(&self, transactions: &[Transaction]) -> Vec<ShardOutbox> {
        let mut outboxes = vec![ShardOutbox::default(); self.router.shard_count().get()];
        for tx in transactions {
            match tx {
                Transaction::Normal(base) | Transaction::Salary(base) => {
                    self.accumulate_coins(base.proof.as_ref(), &mut outboxes);
                }
                Transaction::CustomToken(tx) => {
                    self.accumulate_coins(tx.base.proof.as_ref(), &mut outboxes);
                    self.accumulate_token(&tx.token_data, &mut outboxes);
                }
                Transaction::CustomTokenPrivacy(tx) => {
                    if self.include_privacy_token_outputs {
                        self.accumulate_coins(tx.base.proof.as_ref(), &mut outboxes);
                        self.accumulate_coins(tx.token_proof.as_ref(), &mut outboxes);
                    }
                }
            }
        }
        outboxes
    }

    /// Reduce a transaction batch to one digest per shard.
    pub fn commit(&self, transactions: &[Transaction]) -> ShardDigestRow {
        let row = self.digest_row(&self.group(transactions));
        debug!(
            "[qc-14] Committed {} transactions into {} shard digests",
            transactions.len(),
            row.as_slice().len()
        );
        row
    }

    /// Digest row of outboxes produced by [`Self::group`].
    pub fn digest_row(&self, outboxes: &[ShardOutbox]) -> ShardDigestRow {
        let digests: Vec<Hash> = outboxes.iter().map(ShardOutbox::digest).collect();
        ShardDigestRow::from_validated(digests, self.router.shard_count())
    }

    /// The outbox for one destination shard.
    pub fn payload_for(
        &self,
        transactions: &[Transaction],
        shard_id: ShardId,
    ) -> Result<ShardOutbox> {
        let shard_count = self.router.shard_count().get();
        self.group(transactions)
            .into_iter()
            .nth(shard_id as usize)
            .ok_or(CrossShardError::UnknownShard {
                shard_id: shard_id as usize,
                shard_count,
            })
    }

    /// Shards other than `from_shard` that receive anything from this batch.
    ///
    /// Privacy-token outputs always count here, whatever the commitment flag.
    pub fn destination_shards(
        &self,
        transactions: &[Transaction],
        from_shard: ShardId,
    ) -> Vec<ShardId> {
        let mut targets = BTreeSet::new();
        for tx in transactions {
            for coin in proof_outputs(tx.proof()) {
                targets.insert(self.router.route(coin.pub_key_last_byte()));
            }
            match tx {
                Transaction::Normal(_) | Transaction::Salary(_) => {}
                Transaction::CustomToken(tx) => {
                    for vout in &tx.token_data.vouts {
                        targets.insert(self.router.route(vout.payment_address.last_byte()));
                    }
                }
                Transaction::CustomTokenPrivacy(tx) => {
                    for coin in proof_outputs(tx.token_proof.as_ref()) {
                        targets.insert(self.router.route(coin.pub_key_last_byte()));
                    }
                }
            }
        }

        targets.remove(&from_shard);
        targets.into_iter().collect()
    }

    fn accumulate_coins(&self, proof: Option<&TransactionProof>, outboxes: &mut [ShardOutbox]) {
        for coin in proof_outputs(proof) {
            let shard = self.router.route(coin.pub_key_last_byte());
            outboxes[shard as usize].output_coins.push(coin.clone());
        }
    }

    fn accumulate_token(&self, token: &TxTokenData, outboxes: &mut [ShardOutbox]) {
        for vout in &token.vouts {
            let shard = self.router.route(vout.payment_address.last_byte());
            outboxes[shard as usize].merge_vout(token, vout);
        }
    }
}

fn proof_outputs(proof: Option<&TransactionProof>) -> &[OutputCoin] {
    proof.map(|p| p.output_coins.as_slice()).unwrap_or_default()
}
