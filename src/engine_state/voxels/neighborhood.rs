//! # Chunk Neighborhood Module
//!
//! A [`ChunkNeighborhood`] is a frozen copy of the block layers that touch one chunk
//! from its six face neighbors. The greedy mesher only ever looks one block past each
//! face, so these layers are all it needs to cull boundary faces, and a copy can travel
//! to a worker thread without holding any neighbor's lock.

use super::block::{block_side::BlockSide, BlockId, AIR};
use super::chunk::{Chunk, ChunkCoord, CHUNK_DIMENSION};
use super::world::World;
use crate::engine_state::rendering::meshing::NeighborSampler;

const S: usize = CHUNK_DIMENSION as usize;

/// Snapshot of the neighbor layers bordering one chunk.
#[derive(Debug, Clone)]
pub struct ChunkNeighborhood {
    origin: [i32; 3],
    /// One `S x S` layer per [`BlockSide`], `None` where no neighbor is loaded.
    layers: [Option<Box<[BlockId]>>; 6],
}

impl ChunkNeighborhood {
    /// A neighborhood with nothing loaded around the chunk at `coord`.
    pub fn empty(coord: ChunkCoord) -> Self {
        let origin = Chunk::block_origin(coord);
        ChunkNeighborhood {
            origin: [origin.x, origin.y, origin.z],
            layers: Default::default(),
        }
    }

    /// Copies the bordering layers of every loaded face neighbor of `coord`.
    pub fn capture(world: &World, coord: ChunkCoord) -> Self {
        let mut neighborhood = Self::empty(coord);

        for side in BlockSide::all() {
            if let Some(neighbor) = world.get_chunk_at(side.neighbor(coord)) {
                neighborhood.layers[side as usize] = Some(Self::copy_layer(&neighbor.get(), side));
            }
        }

        neighborhood
    }

    /// Number of face neighbors that were loaded when the snapshot was taken.
    pub fn loaded_neighbors(&self) -> usize {
        self.layers.iter().filter(|layer| layer.is_some()).count()
    }

    /// Copies the layer of `neighbor` that faces back across `side`.
    fn copy_layer(neighbor: &Chunk, side: BlockSide) -> Box<[BlockId]> {
        let axis = side.axis();
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;
        let depth = if side.sign() > 0 { 0 } else { CHUNK_DIMENSION - 1 };

        let mut layer = vec![AIR; S * S];
        for j in 0..S {
            for i in 0..S {
                let mut local = [0i32; 3];
                local[axis] = depth;
                local[u] = i as i32;
                local[v] = j as i32;
                layer[i + j * S] = neighbor.get(local[0], local[1], local[2]);
            }
        }
        layer.into_boxed_slice()
    }
}

impl NeighborSampler for ChunkNeighborhood {
    fn sample(&self, gx: i32, gy: i32, gz: i32) -> BlockId {
        let local = [
            gx.wrapping_sub(self.origin[0]),
            gy.wrapping_sub(self.origin[1]),
            gz.wrapping_sub(self.origin[2]),
        ];

        let mut outside = None;
        for (axis, &value) in local.iter().enumerate() {
            let sign = if value == -1 {
                -1
            } else if value == CHUNK_DIMENSION {
                1
            } else if (0..CHUNK_DIMENSION).contains(&value) {
                continue;
            } else {
                return AIR;
            };
            if outside.is_some() {
                return AIR;
            }
            outside = Some(BlockSide::from_axis(axis, sign));
        }

        let Some(side) = outside else {
            return AIR;
        };
        let axis = side.axis();
        let i = local[(axis + 1) % 3] as usize;
        let j = local[(axis + 2) % 3] as usize;

        self.layers[side as usize]
            .as_ref()
            .map_or(AIR, |layer| layer[i + j * S])
    }
}
