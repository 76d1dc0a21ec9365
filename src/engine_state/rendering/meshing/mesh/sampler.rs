use crate::engine_state::voxels::block::{BlockId, AIR};

/// Resolves a global block coordinate to the block stored there.
///
/// The mesher asks the sampler about every voxel just outside the chunk it is compiling,
/// so faces on the chunk boundary can be culled against the neighboring chunk. Positions
/// that are not loaded must read as [`AIR`].
pub trait NeighborSampler {
    /// Returns the block at global block coordinates `(gx, gy, gz)`.
    fn sample(&self, gx: i32, gy: i32, gz: i32) -> BlockId;
}

impl<F> NeighborSampler for F
where
    F: Fn(i32, i32, i32) -> BlockId,
{
    fn sample(&self, gx: i32, gy: i32, gz: i32) -> BlockId {
        self(gx, gy, gz)
    }
}

/// Sampler for a chunk meshed in isolation: everything outside reads as air.
#[derive(Debug, Default, Clone, Copy)]
pub struct AirSampler;

impl NeighborSampler for AirSampler {
    fn sample(&self, _gx: i32, _gy: i32, _gz: i32) -> BlockId {
        AIR
    }
}
