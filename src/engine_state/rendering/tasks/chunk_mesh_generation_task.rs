//! Task for generating mesh data for chunks in a background thread.
//!
//! This module contains the `ChunkMeshGenerationTask` which compiles a chunk's greedy
//! mesh on a worker thread. The compiled mesh travels back to the main thread, where it
//! is uploaded and installed only if no newer mesh was requested in the meantime.

use log::{debug, error};

use crate::{
    core::MtResource,
    engine_state::{
        rendering::meshing::{greedy_mesh, Mesh, MeshError},
        task_management::task::{Task, TaskContext, TaskResult},
        voxels::{chunk::Chunk, neighborhood::ChunkNeighborhood, world::World},
    },
};

/// A task that compiles the mesh of a chunk in a background thread.
///
/// This task is responsible for:
/// 1. Compiling the chunk's voxels against a snapshot of its neighbors
/// 2. Recording which voxel revision the mesh was built from
/// 3. Handing the mesh back to be installed on the main thread
pub struct ChunkMeshGenerationTask {
    /// The chunk that needs mesh generation
    chunk: MtResource<Chunk>,
    /// Copy of the neighbor layers taken when the task was scheduled
    neighborhood: ChunkNeighborhood,
    /// The mesh request this task answers
    ticket: u64,
}

impl ChunkMeshGenerationTask {
    /// Issues a new mesh ticket for `chunk` and builds the task that answers it.
    ///
    /// The neighbor layers are captured from `world` now, so the worker never touches
    /// any chunk but this one.
    pub fn schedule(world: &World, chunk: MtResource<Chunk>) -> Self {
        let (coord, ticket) = {
            let mut guard = chunk.get_mut();
            (guard.coord(), guard.request_mesh())
        };

        ChunkMeshGenerationTask {
            neighborhood: ChunkNeighborhood::capture(world, coord),
            chunk,
            ticket,
        }
    }

    /// The mesh ticket this task answers.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Task for ChunkMeshGenerationTask {
    /// Compiles the mesh under a read lock of the chunk.
    fn process(&self) -> Box<dyn TaskResult> {
        let (revision, mesh) = {
            let chunk = self.chunk.get();
            (chunk.revision(), greedy_mesh(&chunk, &self.neighborhood))
        };

        Box::new(ChunkMeshGenerationTaskResult {
            chunk: self.chunk.clone(),
            ticket: self.ticket,
            revision,
            mesh,
        })
    }
}

/// The result of a chunk mesh generation task.
pub struct ChunkMeshGenerationTaskResult {
    chunk: MtResource<Chunk>,
    ticket: u64,
    /// Voxel revision the mesh was compiled from
    revision: u64,
    mesh: Result<Mesh, MeshError>,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Installs the compiled mesh.
    ///
    /// A result whose ticket has been superseded is dropped without touching the chunk.
    /// If the chunk's voxels changed while the mesh was compiled, a fresh task is
    /// returned instead.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task>> {
        let ChunkMeshGenerationTaskResult {
            chunk: handle,
            ticket,
            revision,
            mesh,
        } = *self;
        let mut chunk = handle.get_mut();

        if chunk.latest_mesh_request() != ticket {
            debug!(
                "Discarding superseded mesh {} for chunk {}",
                ticket,
                chunk.identifier()
            );
            return Vec::new();
        }

        if chunk.revision() != revision {
            debug!(
                "Chunk {} changed while meshing, rescheduling",
                chunk.identifier()
            );
            drop(chunk);
            return vec![Box::new(ChunkMeshGenerationTask::schedule(
                context.world,
                handle,
            ))];
        }

        let installed = mesh.and_then(|mesh| chunk.apply_mesh(mesh, context.geometry_store));
        match installed {
            Ok(()) => debug!(
                "Installed mesh for chunk {} ({} quads)",
                chunk.identifier(),
                chunk.quads().len()
            ),
            Err(e) => error!("Failed to mesh chunk {}: {}", chunk.identifier(), e),
        }

        Vec::new()
    }
}
