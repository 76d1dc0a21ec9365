//! Greedy meshing implementation for voxel rendering.
//!
//! This module implements the greedy meshing algorithm which combines adjacent coplanar
//! faces with the same block id into larger quads, significantly reducing the number of
//! vertices needed to render a voxel world.
//!
//! # Algorithm
//!
//! For each principal axis `a` the chunk is swept slice by slice, from `d = -1` (the lower
//! boundary against whatever lies just outside) to `d = S - 1`. Every slice produces an
//! `S x S` mask over the two remaining axes `u = (a + 1) % 3` and `v = (a + 2) % 3`: a cell
//! holds a face when exactly one of the voxels at `d` and `d + 1` is solid. The mask is
//! then consumed row by row, growing each unconsumed cell first along `u` and then along
//! `v` into the largest rectangle of identical cells, which is emitted as one [`Quad`].

use log::debug;
use web_time::Instant;

use crate::engine_state::voxels::{
    block::{block_surface, is_solid, BlockId},
    chunk::{Chunk, CHUNK_DIMENSION},
};

use super::{
    mesh::{Mesh, MeshError},
    quad::Quad,
    sampler::NeighborSampler,
};

const S: usize = CHUNK_DIMENSION as usize;

/// One face in a slice mask: which block it shows and which way it points.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct MaskCell {
    pub block_id: BlockId,
    pub normal_sign: i8,
}

/// Row-major `S x S` face mask over the `(u, v)` plane, indexed `i + j * S`.
pub(crate) type SliceMask = [Option<MaskCell>; S * S];

/// Compiles a chunk's voxels into a greedy-merged mesh.
///
/// Voxels outside the chunk are read through `sampler` in global block coordinates. A
/// boundary face is only emitted for a solid voxel of this chunk, and it is culled when
/// the sampled neighbor is solid, so two adjacent chunks never both draw their shared
/// boundary.
///
/// # Errors
/// Returns [`MeshError::IndexOverflow`] if the faces would need more vertices than a
/// 16-bit index buffer can address.
pub fn greedy_mesh(chunk: &Chunk, sampler: &dyn NeighborSampler) -> Result<Mesh, MeshError> {
    let start = Instant::now();

    let mut quads = Vec::new();
    let mut mask: SliceMask = [None; S * S];

    for axis in 0..3 {
        for d in -1..CHUNK_DIMENSION {
            build_slice_mask(chunk, sampler, axis, d, &mut mask);
            merge_slice_mask(&mut mask, axis, d + 1, &mut quads);
        }
    }

    let mut mesh = Mesh::with_quad_capacity(quads.len());
    for quad in quads {
        let surface = block_surface(quad.block_id);
        mesh.push_quad(quad, &surface)?;
    }

    debug!(
        "Greedy meshed chunk {} into {} quads ({} vertices) in {:?}",
        chunk.identifier(),
        mesh.quad_count(),
        mesh.vertex_count(),
        start.elapsed()
    );

    Ok(mesh)
}

/// Reads one voxel for the mask, returning the block id and whether this chunk owns it.
fn voxel_at(chunk: &Chunk, sampler: &dyn NeighborSampler, local: [i32; 3]) -> (BlockId, bool) {
    if Chunk::in_bounds(local[0], local[1], local[2]) {
        (chunk.get(local[0], local[1], local[2]), true)
    } else {
        let origin = chunk.origin();
        let id = sampler.sample(
            origin.x.wrapping_add(local[0]),
            origin.y.wrapping_add(local[1]),
            origin.z.wrapping_add(local[2]),
        );
        (id, false)
    }
}

/// Fills `mask` with the faces on the boundary between slice `d` and `d + 1` along `axis`.
pub(crate) fn build_slice_mask(
    chunk: &Chunk,
    sampler: &dyn NeighborSampler,
    axis: usize,
    d: i32,
    mask: &mut SliceMask,
) {
    let u = (axis + 1) % 3;
    let v = (axis + 2) % 3;

    for j in 0..S {
        for i in 0..S {
            let mut below = [0i32; 3];
            below[axis] = d;
            below[u] = i as i32;
            below[v] = j as i32;
            let mut above = below;
            above[axis] = d + 1;

            let (voxel_a, owns_a) = voxel_at(chunk, sampler, below);
            let (voxel_b, owns_b) = voxel_at(chunk, sampler, above);

            mask[i + j * S] = match (is_solid(voxel_a), is_solid(voxel_b)) {
                (true, false) if owns_a => Some(MaskCell {
                    block_id: voxel_a,
                    normal_sign: 1,
                }),
                (false, true) if owns_b => Some(MaskCell {
                    block_id: voxel_b,
                    normal_sign: -1,
                }),
                _ => None,
            };
        }
    }
}

/// Greedily merges `mask` into quads at `plane`, consuming every cell it covers.
pub(crate) fn merge_slice_mask(mask: &mut SliceMask, axis: usize, plane: i32, quads: &mut Vec<Quad>) {
    for j in 0..S {
        let mut i = 0;
        while i < S {
            let Some(cell) = mask[i + j * S] else {
                i += 1;
                continue;
            };

            let mut width = 1;
            while i + width < S && mask[i + width + j * S] == Some(cell) {
                width += 1;
            }

            let mut height = 1;
            'grow: while j + height < S {
                for k in 0..width {
                    if mask[i + k + (j + height) * S] != Some(cell) {
                        break 'grow;
                    }
                }
                height += 1;
            }

            for row in j..j + height {
                for column in i..i + width {
                    mask[column + row * S] = None;
                }
            }

            quads.push(Quad::new(
                axis,
                plane,
                i,
                j,
                width,
                height,
                cell.block_id,
                cell.normal_sign,
            ));
            i += width;
        }
    }
}
