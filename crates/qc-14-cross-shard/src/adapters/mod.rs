//! # Adapters Layer (Hexagonal Architecture)
//!
//! Reference implementations of the outbound ports: committee rotation,
//! stability instructions and an in-memory beacon/cross-shard store.

mod beacon_store;
mod committee_rotation;
mod stability;

pub use beacon_store::InMemoryBeaconStore;
pub use committee_rotation::FifoCommitteeRotation;
pub use stability::NoStabilityInstructions;
