//! FIFO Committee Rotation Adapter
//!
//! Reference `CommitteeRotation` policy: the oldest members leave first and
//! the longest-waiting candidates join first.

use crate::domain::{CrossShardError, Result};
use crate::ports::outbound::{CommitteeRotation, RotationResult};
use tracing::debug;

/// First-in first-out committee rotation.
///
/// Vacant seats are filled before anyone is evicted. When fewer than
/// `offset` candidates are pending, only that many are rotated.
#[derive(Clone, Copy, Debug, Default)]
pub struct FifoCommitteeRotation;

impl CommitteeRotation for FifoCommitteeRotation {
    fn swap(
        &self,
        pending: &[String],
        committee: &[String],
        committee_size: usize,
        offset: usize,
    ) -> Result<RotationResult> {
        if offset == 0 {
            return Err(CrossShardError::Rotation(
                "swap offset must be positive".to_string(),
            ));
        }
        if offset > committee_size {
            return Err(CrossShardError::Rotation(format!(
                "swap offset {} exceeds committee size {}",
                offset, committee_size
            )));
        }

        let offset = offset.min(pending.len());
        let vacant = committee_size.saturating_sub(committee.len()).min(offset);
        let evict = (offset - vacant).min(committee.len());

        let promoted = pending[..offset].to_vec();
        let evicted = committee[..evict].to_vec();

        let mut new_committee = committee[evict..].to_vec();
        new_committee.extend(promoted.iter().cloned());

        debug!(
            "[qc-14] FIFO rotation: {} vacant, {} evicted, {} promoted",
            vacant,
            evicted.len(),
            promoted.len()
        );

        Ok(RotationResult {
            pending: pending[offset..].to_vec(),
            committee: new_committee,
            evicted,
            promoted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{invariant_committee_size, invariant_swap_conservation};

    fn keys(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    #[test]
    fn test_full_committee_rotates_oldest() {
        let pending = keys("p", 3);
        let committee = keys("c", 4);
        let result = FifoCommitteeRotation
            .swap(&pending, &committee, 4, 2)
            .unwrap();

        assert_eq!(result.evicted, vec!["c0", "c1"]);
        assert_eq!(result.promoted, vec!["p0", "p1"]);
        assert_eq!(result.committee, vec!["c2", "c3", "p0", "p1"]);
        assert_eq!(result.pending, vec!["p2"]);
        assert!(invariant_committee_size(&result.committee, 4));
        assert!(invariant_swap_conservation(
            &committee,
            &result.committee,
            &result.promoted,
            &result.evicted
        ));
    }

    #[test]
    fn test_vacant_seats_filled_first() {
        let pending = keys("p", 3);
        let committee = keys("c", 2);
        let result = FifoCommitteeRotation
            .swap(&pending, &committee, 4, 3)
            .unwrap();

        assert_eq!(result.evicted, vec!["c0"]);
        assert_eq!(result.committee, vec!["c1", "p0", "p1", "p2"]);
        assert!(result.pending.is_empty());
    }

    #[test]
    fn test_short_pending_queue_clamps() {
        let committee = keys("c", 3);
        let result = FifoCommitteeRotation
            .swap(&keys("p", 1), &committee, 3, 2)
            .unwrap();
        assert_eq!(result.promoted, vec!["p0"]);
        assert_eq!(result.evicted, vec!["c0"]);
        assert_eq!(result.committee.len(), 3);

        let result = FifoCommitteeRotation.swap(&[], &committee, 3, 1).unwrap();
        assert!(result.promoted.is_empty());
        assert!(result.evicted.is_empty());
        assert_eq!(result.committee, committee);
    }

    #[test]
    fn test_invalid_offsets() {
        let committee = keys("c", 3);
        assert!(matches!(
            FifoCommitteeRotation.swap(&keys("p", 2), &committee, 3, 0),
            Err(CrossShardError::Rotation(_))
        ));
        assert!(matches!(
            FifoCommitteeRotation.swap(&keys("p", 5), &committee, 3, 4),
            Err(CrossShardError::Rotation(_))
        ));
    }
}
