//! # Engine State Module
//!
//! The core engine module that manages the state and functionality of the voxel engine.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `geometry_state` - Owns uploaded chunk geometry
//! * `rendering` - Greedy meshing and the background meshing task
//! * `task_management` - Manages asynchronous tasks and worker threads
//! * `voxels` - Handles voxel data, chunks, and world generation
//!
//! ## Architecture
//!
//! `EngineState` is the central coordinator. It owns the [`World`], the geometry store
//! every chunk model is uploaded to, and (when background meshing is enabled) the
//! [`TaskManager`]. Everything that touches the world or the store happens on the thread
//! that owns the `EngineState`; workers only compile meshes and generate voxels.
//!
//! ## Meshing Modes
//!
//! * `mesh_workers == 0`: chunks are meshed inline, as soon as they change
//! * `mesh_workers > 0`: meshes are compiled on workers and installed by [`EngineState::frame`]
//!   (or [`EngineState::flush`])
//!
//! Both modes compile against the same neighbor snapshot, so they produce identical models.

use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info, warn};

use crate::application_state::config::EngineConfig;
use crate::core::MtResource;
use geometry_state::{CpuGeometryStore, GeometryId, SharedGeometryStore};
use rendering::{meshing::mesh_chunk, tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask};
use task_management::{task::TaskContext, TaskManager};
use voxels::{
    block::{block_side::BlockSide, BlockId},
    chunk::{chunk_path::ChunkPath, Chunk, CHUNK_DIMENSION},
    generation::WorldGenerator,
    neighborhood::ChunkNeighborhood,
    tasks::chunk_generation_task::ChunkGenerationTask,
    world::World,
};

pub mod geometry_state;
pub mod rendering;
pub mod task_management;
pub mod voxels;

/// What a renderer needs to draw one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecord {
    /// The chunk's identifier
    pub identifier: String,
    /// Global block coordinates of the chunk's corner, the model's translation
    pub origin: Point3<i32>,
    /// The uploaded geometry to bind
    pub geometry: GeometryId,
    /// Vertices in the geometry
    pub vertex_count: usize,
    /// Triangles in the geometry
    pub triangle_count: usize,
    /// Merged faces in the model
    pub quad_count: usize,
}

/// The main state container for the voxel engine
///
/// # Examples
///
/// ```
/// use voxel_world::{EngineConfig, EngineState, GeneratorKind};
///
/// let config = EngineConfig {
///     generator: GeneratorKind::Solid,
///     spawn_radius: 0,
///     ..EngineConfig::default()
/// };
/// let mut engine = EngineState::new(config);
/// engine.init();
///
/// let draw_list = engine.draw_list();
/// assert_eq!(draw_list.len(), 1);
/// assert_eq!(draw_list[0].quad_count, 6);
///
/// engine.shutdown();
/// ```
pub struct EngineState {
    config: EngineConfig,
    /// The voxel world containing all chunk data
    world: World,
    /// Store every chunk model is uploaded to
    geometry_store: SharedGeometryStore,
    /// Background workers, absent when meshing inline
    task_manager: Option<TaskManager>,
}

impl EngineState {
    /// Creates an engine with a CPU-resident geometry store sized by the config's budget.
    pub fn new(config: EngineConfig) -> Self {
        let store = Arc::new(CpuGeometryStore::with_budget(config.geometry_budget_bytes));
        Self::with_geometry_store(config, store)
    }

    /// Creates an engine that uploads chunk geometry to `geometry_store`.
    pub fn with_geometry_store(config: EngineConfig, geometry_store: SharedGeometryStore) -> Self {
        let generator: Arc<dyn WorldGenerator> = Arc::from(config.generator.build(config.seed));
        let task_manager = (config.mesh_workers > 0).then(|| TaskManager::new(config.mesh_workers));

        EngineState {
            world: World::new(generator),
            geometry_store,
            task_manager,
            config,
        }
    }

    /// The configuration the engine was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The voxel world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The store chunk geometry is uploaded to.
    pub fn geometry_store(&self) -> &SharedGeometryStore {
        &self.geometry_store
    }

    /// Returns `true` if meshes are compiled on background workers.
    pub fn uses_workers(&self) -> bool {
        self.task_manager.is_some()
    }

    /// Spawns the chunks around the origin and meshes them.
    ///
    /// All chunks are generated before any is meshed, so faces between spawned chunks
    /// are culled from the start. Returns the number of chunks spawned.
    pub fn init(&mut self) -> usize {
        let start = web_time::Instant::now();

        let spawned = self.world.spawn(self.config.spawn_radius);
        for chunk in &spawned {
            self.remesh(chunk.clone());
        }

        info!(
            "Engine initialized with {} chunks in {:?}",
            spawned.len(),
            start.elapsed()
        );
        spawned.len()
    }

    /// Requests the chunk at `path`.
    ///
    /// Inline, the chunk is generated and meshed (with its face neighbors) immediately.
    /// With workers, generation is queued and the chunk appears once its result is
    /// handled. Returns `false` if a chunk is already registered at `path`.
    pub fn request_chunk(&mut self, path: ChunkPath) -> bool {
        if self.world.registry().contains(&path) {
            return false;
        }

        if let Some(task_manager) = self.task_manager.as_mut() {
            task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                self.world.generator(),
                path,
            )));
            return true;
        }

        let Some(chunk) = self.world.add_chunk_at_path(path) else {
            return false;
        };
        let coord = chunk.get().coord();
        self.remesh(chunk);
        for neighbor in World::neighbor_coords(coord) {
            if let Some(neighbor) = self.world.get_chunk_at(neighbor) {
                self.remesh(neighbor);
            }
        }
        true
    }

    /// Sets the block at global block coordinates and remeshes what it affects.
    ///
    /// The owning chunk is remeshed, along with each face neighbor whose boundary the
    /// block touches. Returns `false` if no chunk is loaded there.
    pub fn set_block(&mut self, gx: i32, gy: i32, gz: i32, id: BlockId) -> bool {
        let global = [gx, gy, gz];
        let coord = Point3::new(
            gx.div_euclid(CHUNK_DIMENSION),
            gy.div_euclid(CHUNK_DIMENSION),
            gz.div_euclid(CHUNK_DIMENSION),
        );
        let local = global.map(|value| value.rem_euclid(CHUNK_DIMENSION));

        let Some(chunk) = self.world.get_chunk_at(coord) else {
            warn!("No chunk loaded at block ({}, {}, {})", gx, gy, gz);
            return false;
        };
        chunk.get_mut().set(local[0], local[1], local[2], id);
        self.remesh(chunk);

        for (axis, &value) in local.iter().enumerate() {
            let sign = if value == 0 {
                -1
            } else if value == CHUNK_DIMENSION - 1 {
                1
            } else {
                continue;
            };
            let side = BlockSide::from_axis(axis, sign);
            if let Some(neighbor) = self.world.get_chunk_at(side.neighbor(coord)) {
                self.remesh(neighbor);
            }
        }
        true
    }

    /// Rebuilds the model of `chunk`, inline or on a worker.
    ///
    /// Inline, returns `false` if the new geometry could not be allocated; the chunk keeps
    /// its previous model and can be remeshed again later. With workers the mesh is only
    /// scheduled, so this always returns `true`.
    pub fn remesh(&mut self, chunk: MtResource<Chunk>) -> bool {
        match self.task_manager.as_mut() {
            Some(task_manager) => {
                task_manager.publish_task(Box::new(ChunkMeshGenerationTask::schedule(
                    &self.world,
                    chunk,
                )));
                true
            }
            None => {
                let coord = chunk.get().coord();
                let neighborhood = ChunkNeighborhood::capture(&self.world, coord);
                let mut chunk = chunk.get_mut();
                chunk.request_mesh();
                let meshed = mesh_chunk(&mut chunk, &neighborhood, &self.geometry_store);
                if !meshed {
                    warn!(
                        "Chunk {} left with its previous model",
                        chunk.identifier()
                    );
                }
                meshed
            }
        }
    }

    /// Handles finished background work and hands queued work to idle workers.
    ///
    /// Call once per frame. Does nothing when meshing inline.
    pub fn frame(&mut self) {
        if let Some(task_manager) = self.task_manager.as_mut() {
            let mut context = TaskContext {
                world: &mut self.world,
                geometry_store: &self.geometry_store,
            };
            task_manager.process_completed_tasks(&mut context);
            task_manager.process_queued_tasks();
        }
    }

    /// Blocks until all background work, including follow-ups, has been handled.
    pub fn flush(&mut self) {
        if let Some(task_manager) = self.task_manager.as_mut() {
            let mut context = TaskContext {
                world: &mut self.world,
                geometry_store: &self.geometry_store,
            };
            task_manager.wait_for_all(&mut context);
        }
    }

    /// Number of background tasks queued or running.
    pub fn pending_tasks(&self) -> usize {
        self.task_manager
            .as_ref()
            .map_or(0, |task_manager| task_manager.pending_tasks())
    }

    /// One record per chunk with a model, ordered by chunk coordinate.
    pub fn draw_list(&self) -> Vec<DrawRecord> {
        let draw_list: Vec<_> = self
            .world
            .chunks()
            .iter()
            .filter_map(|chunk| {
                let chunk = chunk.get();
                let model = chunk.model()?;
                Some(DrawRecord {
                    identifier: chunk.identifier(),
                    origin: chunk.origin(),
                    geometry: model.geometry().id(),
                    vertex_count: model.vertex_count(),
                    triangle_count: model.triangle_count(),
                    quad_count: model.quads().len(),
                })
            })
            .collect();

        debug!("Draw list holds {} chunks", draw_list.len());
        draw_list
    }

    /// Saves every loaded chunk to the configured save directory.
    ///
    /// Returns the number of chunks written. Failures are logged per chunk.
    pub fn save_all(&self) -> usize {
        let chunks = self.world.chunks();
        let saved = chunks
            .iter()
            .filter(|chunk| chunk.get().save(&self.config.save_directory))
            .count();

        info!(
            "Saved {}/{} chunks to {}",
            saved,
            chunks.len(),
            self.config.save_directory.display()
        );
        saved
    }

    /// Reloads every loaded chunk from the configured save directory and remeshes them.
    ///
    /// Returns the number of chunks whose file was read. Chunks without a valid file keep
    /// their voxels.
    pub fn load_all(&mut self) -> usize {
        let chunks = self.world.chunks();
        let loaded = chunks
            .iter()
            .filter(|chunk| chunk.get_mut().load(&self.config.save_directory))
            .count();

        for chunk in chunks.iter().cloned() {
            self.remesh(chunk);
        }

        info!(
            "Loaded {}/{} chunks from {}",
            loaded,
            chunks.len(),
            self.config.save_directory.display()
        );
        loaded
    }

    /// Stops the workers and drops every chunk, releasing their geometry.
    ///
    /// Work still queued is abandoned. The engine can be initialized again afterwards.
    pub fn shutdown(&mut self) {
        let restart_workers = self.task_manager.take().map(|task_manager| task_manager.worker_count());

        self.world.clear();
        if let Some(workers) = restart_workers {
            self.task_manager = Some(TaskManager::new(workers));
        }
        info!("Engine shut down");
    }
}
