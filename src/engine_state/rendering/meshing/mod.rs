//! Mesh generation and management for voxel rendering.
//!
//! This module handles the conversion of voxel data into uploaded chunk geometry.
//! Compilation ([`greedy_mesh`]) is a pure function of a chunk's voxels and its
//! neighbors, so it can run on any thread. Installing the result ([`Chunk::apply_mesh`])
//! touches the geometry store and must happen on the thread that owns the chunk's model.
//!
//! # Architecture
//! - `mesh/`: the greedy mesher, the mesh buffers and the neighbor sampler contract
//! - [`mesh_chunk`]: compile and install in one step, reporting success as a flag

mod mesh;

pub use mesh::*;

use log::error;

use crate::engine_state::{geometry_state::SharedGeometryStore, voxels::chunk::Chunk};

/// Compiles `chunk` and replaces its model with the result.
///
/// Returns `false` only when the geometry could not be allocated (the store refused the
/// upload or the mesh outgrew its 16-bit index buffer). The chunk then keeps its previous
/// model. A chunk with no exposed faces is meshed successfully and ends up without a model.
pub fn mesh_chunk(
    chunk: &mut Chunk,
    sampler: &dyn NeighborSampler,
    store: &SharedGeometryStore,
) -> bool {
    let result = greedy_mesh(chunk, sampler).and_then(|mesh| chunk.apply_mesh(mesh, store));

    match result {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to mesh chunk {}: {}", chunk.identifier(), e);
            false
        }
    }
}
