//! # Cross-Shard Merkle Tree
//!
//! Flattened binary Merkle tree over a block's shard digest row.
//!
//! ```text
//!                 r = H(h01, h23)              nodes: [d0, d1, d2, d3, h01, h23, r]
//!               /                \             widths:  [4, 2, 1]
//!      h01 = H(d0, d1)     h23 = H(d2, d3)     offsets: [0, 4, 6]
//!        /      \            /      \
//!       d0      d1          d2      d3
//! ```
//!
//! Every level is stored after the previous one in a single sequence, root
//! last. The per-level widths and base offsets are computed once from the
//! leaf count and shared by construction and proof extraction, so the two can
//! never disagree on where a level starts.

use super::accumulator::CrossShardAccumulator;
use crate::domain::{
    CrossShardError, Hash, Result, ShardCount, ShardDigestRow, ShardId, Transaction,
};
use serde::{Deserialize, Serialize};

/// Width and base offset of every level, leaves first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleLayout {
    widths: Vec<usize>,
    offsets: Vec<usize>,
}

impl MerkleLayout {
    /// Layout for a tree of `shard_count` leaves.
    pub fn new(shard_count: ShardCount) -> Self {
        let levels = shard_count.depth() + 1;
        let mut widths = Vec::with_capacity(levels);
        let mut offsets = Vec::with_capacity(levels);

        let mut width = shard_count.get();
        let mut offset = 0;
        loop {
            widths.push(width);
            offsets.push(offset);
            if width == 1 {
                break;
            }
            offset += width;
            width /= 2;
        }

        Self { widths, offsets }
    }

    /// Number of levels including leaves and root.
    pub fn levels(&self) -> usize {
        self.widths.len()
    }

    /// Width of `level`.
    pub fn width(&self, level: usize) -> usize {
        self.widths[level]
    }

    /// Absolute index of the first node of `level`.
    pub fn offset(&self, level: usize) -> usize {
        self.offsets[level]
    }

    /// Leaf count.
    pub fn leaf_count(&self) -> usize {
        self.widths[0]
    }

    /// Total node count, `2N - 1`.
    pub fn node_count(&self) -> usize {
        2 * self.leaf_count() - 1
    }
}

/// Every node of the tree, leaves first, root last.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleLayer {
    nodes: Vec<Hash>,
    layout: MerkleLayout,
}

impl MerkleLayer {
    /// Flat node sequence.
    pub fn nodes(&self) -> &[Hash] {
        &self.nodes
    }

    /// Level geometry.
    pub fn layout(&self) -> &MerkleLayout {
        &self.layout
    }

    /// Number of leaves (shards).
    pub fn leaf_count(&self) -> usize {
        self.layout.leaf_count()
    }

    /// Root digest.
    pub fn root(&self) -> Hash {
        // never empty: a layout has at least one leaf
        self.nodes[self.nodes.len() - 1]
    }
}

/// Inclusion proof of one shard's leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Shard the proof is issued for.
    pub shard_id: ShardId,
    /// Leaf committed for that shard.
    pub leaf: Hash,
    /// Sibling digests, leaf level first.
    pub siblings: Vec<Hash>,
    /// Tree root.
    pub root: Hash,
}

/// Builds trees and proofs for a fixed shard count.
#[derive(Clone, Debug)]
pub struct MerkleTreeBuilder {
    layout: MerkleLayout,
}

impl MerkleTreeBuilder {
    /// Create a builder for `shard_count` leaves.
    pub fn new(shard_count: ShardCount) -> Self {
        Self {
            layout: MerkleLayout::new(shard_count),
        }
    }

    /// Level geometry used by this builder.
    pub fn layout(&self) -> &MerkleLayout {
        &self.layout
    }

    /// Build the flattened tree over a digest row.
    pub fn build(&self, row: &ShardDigestRow) -> Result<MerkleLayer> {
        if row.as_slice().len() != self.layout.leaf_count() {
            return Err(CrossShardError::RowLength {
                expected: self.layout.leaf_count(),
                got: row.as_slice().len(),
            });
        }

        let mut nodes = Vec::with_capacity(self.layout.node_count());
        nodes.extend_from_slice(row.as_slice());

        for level in 0..self.layout.levels() - 1 {
            let base = self.layout.offset(level);
            for pair in 0..self.layout.width(level) / 2 {
                let left = nodes[base + 2 * pair];
                let right = nodes[base + 2 * pair + 1];
                nodes.push(Hash::concat(&left, &right));
            }
        }

        Ok(MerkleLayer {
            nodes,
            layout: self.layout.clone(),
        })
    }

    /// Sibling path of `shard_id`, leaf level first, plus the root.
    pub fn proof_for(&self, layer: &MerkleLayer, shard_id: ShardId) -> Result<MerkleProof> {
        let layout = layer.layout();
        let mut index = shard_id as usize;
        if index >= layout.leaf_count() {
            return Err(CrossShardError::UnknownShard {
                shard_id: index,
                shard_count: layout.leaf_count(),
            });
        }

        let leaf = layer.nodes[index];
        let mut siblings = Vec::with_capacity(layout.levels() - 1);
        for level in 0..layout.levels() - 1 {
            let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };
            siblings.push(layer.nodes[layout.offset(level) + sibling]);
            index /= 2;
        }

        Ok(MerkleProof {
            shard_id,
            leaf,
            siblings,
            root: layer.root(),
        })
    }
}

/// Row and tree of a block's transaction list, as committed in its header.
pub fn create_shard_tx_root(
    accumulator: &CrossShardAccumulator,
    builder: &MerkleTreeBuilder,
    transactions: &[Transaction],
) -> Result<(ShardDigestRow, MerkleLayer)> {
    let row = accumulator.commit(transactions);
    let layer = builder.build(&row)?;
    Ok((row, layer))
}

/// Root over an arbitrary-length list of digests.
///
/// A node without a right sibling is paired with itself at every level.
/// An empty list has the zero-value root.
pub fn merkle_root_of_hashes(hashes: &[Hash]) -> Hash {
    if hashes.is_empty() {
        return Hash::zero_value();
    }

    let mut level: Vec<Hash> = hashes.to_vec();
    while level.len() > 1 {
        let mut next_level = Vec::with_capacity((level.len() + 1) / 2);
        for chunk in level.chunks(2) {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left);
            next_level.push(Hash::concat(left, right));
        }
        level = next_level;
    }

    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_row(n: u16) -> ShardDigestRow {
        let count = ShardCount::new(n).unwrap();
        let digests = (0..n).map(|i| Hash::digest(&i.to_be_bytes())).collect();
        ShardDigestRow::new(digests, count).unwrap()
    }

    fn builder(n: u16) -> MerkleTreeBuilder {
        MerkleTreeBuilder::new(ShardCount::new(n).unwrap())
    }

    #[test]
    fn test_layout_four() {
        let layout = MerkleLayout::new(ShardCount::new(4).unwrap());
        assert_eq!(layout.levels(), 3);
        assert_eq!(
            (0..3).map(|l| layout.width(l)).collect::<Vec<_>>(),
            vec![4, 2, 1]
        );
        assert_eq!(
            (0..3).map(|l| layout.offset(l)).collect::<Vec<_>>(),
            vec![0, 4, 6]
        );
        assert_eq!(layout.node_count(), 7);
    }

    #[test]
    fn test_build_four_matches_manual() {
        let row = make_row(4);
        let layer = builder(4).build(&row).unwrap();
        let d = row.as_slice();
        let h01 = Hash::concat(&d[0], &d[1]);
        let h23 = Hash::concat(&d[2], &d[3]);
        assert_eq!(layer.nodes().len(), 7);
        assert_eq!(layer.nodes()[4], h01);
        assert_eq!(layer.nodes()[5], h23);
        assert_eq!(layer.root(), Hash::concat(&h01, &h23));
    }

    #[test]
    fn test_build_single_shard() {
        let row = make_row(1);
        let layer = builder(1).build(&row).unwrap();
        assert_eq!(layer.nodes().len(), 1);
        assert_eq!(layer.root(), row.as_slice()[0]);
        let proof = builder(1).proof_for(&layer, 0).unwrap();
        assert!(proof.siblings.is_empty());
    }

    #[test]
    fn test_build_rejects_foreign_row() {
        assert!(matches!(
            builder(8).build(&make_row(4)),
            Err(CrossShardError::RowLength {
                expected: 8,
                got: 4
            })
        ));
    }

    #[test]
    fn test_proof_siblings_four() {
        let row = make_row(4);
        let b = builder(4);
        let layer = b.build(&row).unwrap();
        let d = row.as_slice();

        let proof = b.proof_for(&layer, 2).unwrap();
        assert_eq!(proof.leaf, d[2]);
        assert_eq!(proof.siblings, vec![d[3], Hash::concat(&d[0], &d[1])]);
        assert_eq!(proof.root, layer.root());

        let proof = b.proof_for(&layer, 1).unwrap();
        assert_eq!(proof.siblings, vec![d[0], Hash::concat(&d[2], &d[3])]);
    }

    #[test]
    fn test_proof_unknown_shard() {
        let b = builder(4);
        let layer = b.build(&make_row(4)).unwrap();
        assert!(matches!(
            b.proof_for(&layer, 4),
            Err(CrossShardError::UnknownShard { shard_id: 4, .. })
        ));
    }

    #[test]
    fn test_proof_length_is_depth() {
        for n in [2u16, 8, 32, 256] {
            let b = builder(n);
            let layer = b.build(&make_row(n)).unwrap();
            for shard in [0, n - 1] {
                let proof = b.proof_for(&layer, shard as ShardId).unwrap();
                assert_eq!(proof.siblings.len(), n.trailing_zeros() as usize);
            }
        }
    }

    #[test]
    fn test_merkle_root_of_hashes() {
        let h: Vec<Hash> = (0u8..3).map(|i| Hash::digest(&[i])).collect();
        assert_eq!(merkle_root_of_hashes(&[]), Hash::zero_value());
        assert_eq!(merkle_root_of_hashes(&h[..1]), h[0]);
        let expected = Hash::concat(&Hash::concat(&h[0], &h[1]), &Hash::concat(&h[2], &h[2]));
        assert_eq!(merkle_root_of_hashes(&h), expected);
    }
}
