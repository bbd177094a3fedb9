//! Stability Instruction Adapter
//!
//! Empty `StabilityInstructionSource` for deployments without a governance
//! subsystem.

use crate::domain::{Instruction, Result};
use crate::ports::outbound::{ShardBlockContext, StabilityInstructionSource};

/// Emits no stability instructions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStabilityInstructions;

impl StabilityInstructionSource for NoStabilityInstructions {
    fn build_stability_instructions(&self, _ctx: &ShardBlockContext<'_>) -> Result<Vec<Instruction>> {
        Ok(Vec::new())
    }
}
