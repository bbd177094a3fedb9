//! # Ports Layer (Hexagonal Architecture)
//!
//! - `inbound`: what the subsystem offers
//! - `outbound`: what the subsystem needs

pub mod inbound;
pub mod outbound;

pub use inbound::CrossShardApi;
pub use outbound::{
    BeaconChainStore, CommitteeRotation, RotationResult, ShardBlockContext,
    StabilityInstructionSource,
};
