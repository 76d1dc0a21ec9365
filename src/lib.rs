#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The world core of a chunked voxel engine: block storage, hierarchical chunk
//! addressing, greedy meshing and chunk persistence.
//!
//! ## Key Modules
//!
//! * `application_state` - Configuration and logger bootstrap
//! * `core` - The shared-ownership primitive used for chunks
//! * `engine_state` - The world, meshing, geometry ownership and task management
//!
//! ## Architecture
//!
//! A [`World`] holds [`Chunk`]s of `16³` [`BlockId`]s. Each chunk is addressed by a
//! [`ChunkPath`] tracked in a [`ChunkRegistry`] and by a flat [`ChunkCoord`]. The greedy
//! mesher ([`greedy_mesh`]) turns a chunk into a [`Mesh`] of merged [`Quad`]s, which is
//! uploaded to a [`GeometryStore`] and owned by the chunk until it is remeshed or dropped.
//! [`EngineState`] ties these together and hands renderers a [`DrawRecord`] list.
//!
//! ## Usage
//!
//! ```rust
//! use voxel_world::{EngineConfig, EngineState, GeneratorKind};
//!
//! let mut engine = EngineState::new(EngineConfig {
//!     generator: GeneratorKind::Heightmap,
//!     spawn_radius: 1,
//!     ..EngineConfig::default()
//! });
//! engine.init();
//!
//! for record in engine.draw_list() {
//!     assert!(record.triangle_count > 0);
//! }
//! ```

use log::info;

mod application_state;
mod core;
mod engine_state;

pub use application_state::{
    config::{ConfigError, EngineConfig},
    init_logging,
};
pub use crate::core::MtResource;
pub use engine_state::{
    geometry_state::{
        CpuGeometryStore, GeometryAnalytics, GeometryError, GeometryHandle, GeometryId,
        GeometryStore, SharedGeometryStore,
    },
    rendering::{
        meshing::{
            greedy_mesh, mesh_chunk, AirSampler, Mesh, MeshError, NeighborSampler, Quad,
            MAX_VERTICES,
        },
        tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
        Vertex,
    },
    task_management::{
        task::{Task, TaskContext, TaskResult},
        TaskManager, MAX_TASKS_IN_FLIGHT,
    },
    voxels::{
        block::{
            block_side::BlockSide, block_surface, block_type::BlockType, is_solid, BlockId,
            BlockSurface, UvRect, AIR,
        },
        chunk::{
            chunk_io::{ChunkIoError, CHUNK_FILE_EXTENSION},
            chunk_path::ChunkPath,
            Chunk, ChunkCoord, ChunkModel, CHUNK_DIMENSION, CHUNK_PLANE_SIZE, CHUNK_SIZE,
        },
        generation::{
            GeneratorKind, HeightmapGenerator, PerlinGenerator, RandomGenerator,
            UniformGenerator, WorldGenerator,
        },
        neighborhood::ChunkNeighborhood,
        registry::ChunkRegistry,
        tasks::chunk_generation_task::ChunkGenerationTask,
        world::World,
    },
    DrawRecord, EngineState,
};

/// Config files tried by [`run`], in order.
pub const CONFIG_CANDIDATES: [&str; 2] = ["config.json", "../config.json"];

/// Runs the engine headless: spawns the world, meshes it, saves it and shuts down.
pub fn run() {
    let config = EngineConfig::load_or_default(&CONFIG_CANDIDATES);
    init_logging(config.log_filter.as_deref());

    let mut engine = EngineState::new(config);
    engine.init();
    engine.flush();

    let draw_list = engine.draw_list();
    let triangles: usize = draw_list.iter().map(|record| record.triangle_count).sum();
    info!(
        "{} chunks to draw, {} triangles",
        draw_list.len(),
        triangles
    );

    engine.save_all();
    engine.shutdown();
}
