//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which handles asynchronous
//! generation of chunk data. The voxels are produced on a worker thread; the finished
//! chunk joins the world on the main thread, where its mesh (and the meshes of the
//! neighbors it now borders) are scheduled.

use std::sync::Arc;

use log::debug;

use crate::{
    core::MtResource,
    engine_state::{
        rendering::tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
        task_management::task::{Task, TaskContext, TaskResult},
        voxels::{
            chunk::{chunk_path::ChunkPath, Chunk},
            generation::WorldGenerator,
            world::World,
        },
    },
};

/// A task that generates chunk data asynchronously.
///
/// This task is responsible for:
/// 1. Generating the chunk data at the specified path
/// 2. Adding the chunk to the world
/// 3. Scheduling mesh generation for the chunk and its loaded face neighbors
pub struct ChunkGenerationTask {
    /// Fills the new chunk's voxels
    generator: Arc<dyn WorldGenerator>,
    /// The address of the chunk to generate
    path: ChunkPath,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    pub fn new(generator: Arc<dyn WorldGenerator>, path: ChunkPath) -> Self {
        ChunkGenerationTask { generator, path }
    }
}

impl Task for ChunkGenerationTask {
    /// Builds and fills the chunk. Nothing is shared with the world yet.
    fn process(&self) -> Box<dyn TaskResult> {
        let mut chunk = Chunk::with_path(self.path.clone());
        chunk.fill_from(self.generator.as_ref());

        Box::new(ChunkGenerationTaskResult {
            chunk: MtResource::new(chunk),
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    /// The generated chunk
    chunk: MtResource<Chunk>,
}

impl TaskResult for ChunkGenerationTaskResult {
    /// Adds the chunk to the world and schedules the meshes that depend on it.
    ///
    /// If the world refuses the chunk (its path or coordinate is taken), it is dropped
    /// and nothing is scheduled.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task>> {
        if !context.world.insert_chunk(self.chunk.clone()) {
            return Vec::new();
        }

        let coord = self.chunk.get().coord();
        debug!("Generated chunk {}", self.chunk.get().identifier());

        let world: &World = context.world;
        let mut tasks: Vec<Box<dyn Task>> = vec![Box::new(ChunkMeshGenerationTask::schedule(
            world,
            self.chunk.clone(),
        ))];

        tasks.extend(
            World::neighbor_coords(coord)
                .into_iter()
                .filter_map(|neighbor| world.get_chunk_at(neighbor))
                .map(|neighbor| -> Box<dyn Task> {
                    Box::new(ChunkMeshGenerationTask::schedule(world, neighbor))
                }),
        );

        tasks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::geometry_state::{CpuGeometryStore, SharedGeometryStore};
    use crate::engine_state::voxels::{chunk::ChunkCoord, generation::UniformGenerator};

    #[test]
    fn generated_chunk_joins_the_world_and_schedules_meshes() {
        let generator: Arc<dyn WorldGenerator> = Arc::new(UniformGenerator::new(2));
        let mut world = World::new(generator.clone());
        world.add_chunk_at(ChunkCoord::new(1, 0, 0));
        let store: SharedGeometryStore = Arc::new(CpuGeometryStore::new());

        let path = ChunkPath::root();
        let task = ChunkGenerationTask::new(generator, path.child(0, 0, 0));
        let result = task.process();

        let mut context = TaskContext {
            world: &mut world,
            geometry_store: &store,
        };
        let follow_ups = result.handle_result(&mut context);
        assert_eq!(follow_ups.len(), 2);

        let chunk = world.get_chunk_at(ChunkCoord::new(0, 0, 0)).unwrap();
        assert_eq!(chunk.get().get(5, 5, 5), 2);
        assert!(world.registry().contains(&path.child(0, 0, 0)));
    }

    #[test]
    fn refused_chunk_schedules_nothing() {
        let generator: Arc<dyn WorldGenerator> = Arc::new(UniformGenerator::new(2));
        let mut world = World::new(generator.clone());
        world.add_chunk_at(ChunkCoord::new(0, 0, 0));
        let store: SharedGeometryStore = Arc::new(CpuGeometryStore::new());

        let task = ChunkGenerationTask::new(generator, ChunkPath::root().child(0, 0, 0));
        let mut context = TaskContext {
            world: &mut world,
            geometry_store: &store,
        };
        assert!(task.process().handle_result(&mut context).is_empty());
        assert_eq!(world.chunk_count(), 1);
    }
}
