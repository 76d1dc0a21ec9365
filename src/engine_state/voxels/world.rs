//! # World Module
//!
//! This module provides the `World` struct which manages a collection of chunks in the voxel world.
//! It serves as the central coordinator for chunk creation, lookup and cross-chunk block access.
//!
//! ## Architecture
//!
//! The world uses a sparse storage approach where only chunks that have been created are
//! kept in memory. Every chunk is reachable from a flat map keyed by chunk coordinate;
//! chunks created from a [`ChunkPath`] are also tracked by the [`ChunkRegistry`]. Both
//! hold shared references, so a chunk lives until the last of them lets go.
//!
//! ## Chunk Generation
//!
//! New chunks are filled by the world's [`WorldGenerator`], chosen at construction.

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, info, warn};

use crate::core::MtResource;
use crate::engine_state::rendering::meshing::NeighborSampler;

use super::block::{BlockId, AIR};
use super::chunk::{
    chunk_path::{ChunkPath, STEP_X_RANGE, STEP_Z_RANGE},
    Chunk, ChunkCoord, CHUNK_DIMENSION,
};
use super::generation::WorldGenerator;
use super::registry::ChunkRegistry;

/// Represents a voxel world composed of multiple chunks.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use cgmath::Point3;
/// use voxel_world::{UniformGenerator, World};
///
/// let mut world = World::new(Arc::new(UniformGenerator::new(1)));
/// world.add_chunk_at(Point3::new(0, 0, 0));
///
/// assert!(world.get_chunk_at(Point3::new(0, 0, 0)).is_some());
/// assert_eq!(world.sample_block(3, 3, 3), 1);
/// assert_eq!(world.sample_block(-1, 3, 3), 0);
/// ```
pub struct World {
    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<ChunkCoord, MtResource<Chunk>>,
    /// Path-addressed chunks.
    registry: ChunkRegistry,
    /// Fills newly created chunks.
    generator: Arc<dyn WorldGenerator>,
}

impl World {
    /// Creates a new, empty world whose chunks are filled by `generator`.
    pub fn new(generator: Arc<dyn WorldGenerator>) -> Self {
        World {
            chunks: HashMap::new(),
            registry: ChunkRegistry::new(),
            generator,
        }
    }

    /// The generator that fills new chunks.
    pub fn generator(&self) -> Arc<dyn WorldGenerator> {
        self.generator.clone()
    }

    /// The registry of path-addressed chunks.
    pub fn registry(&self) -> &ChunkRegistry {
        &self.registry
    }

    /// Adds a generated chunk at `position` (root path, flat map only).
    ///
    /// Returns the existing chunk if one is already there.
    pub fn add_chunk_at(&mut self, position: ChunkCoord) -> MtResource<Chunk> {
        if let Some(existing) = self.chunks.get(&position) {
            return existing.clone();
        }

        let mut chunk = Chunk::new(position);
        chunk.fill_from(self.generator.as_ref());
        let chunk = MtResource::new(chunk);
        self.chunks.insert(position, chunk.clone());
        chunk
    }

    /// Adds a generated chunk addressed by `path`.
    ///
    /// Returns `None` if the path or its derived coordinate is already taken.
    pub fn add_chunk_at_path(&mut self, path: ChunkPath) -> Option<MtResource<Chunk>> {
        let mut chunk = Chunk::with_path(path);
        chunk.fill_from(self.generator.as_ref());
        let chunk = MtResource::new(chunk);
        self.insert_chunk(chunk.clone()).then_some(chunk)
    }

    /// Tracks an already built, path-addressed chunk.
    ///
    /// The chunk is refused if the registry rejects its path or its coordinate is occupied.
    pub fn insert_chunk(&mut self, chunk: MtResource<Chunk>) -> bool {
        let coord = chunk.get().coord();
        if self.chunks.contains_key(&coord) {
            warn!(
                "Chunk {} not added: coordinate {:?} is occupied",
                chunk.get().identifier(),
                coord
            );
            return false;
        }
        if !self.registry.add(chunk.clone()) {
            return false;
        }

        self.chunks.insert(coord, chunk);
        true
    }

    /// Removes the chunk at `path` from the registry and the flat map.
    pub fn remove_chunk(&mut self, path: &ChunkPath) -> Option<MtResource<Chunk>> {
        let chunk = self.registry.remove(path)?;
        let coord = chunk.get().coord();
        if self
            .chunks
            .get(&coord)
            .is_some_and(|stored| stored.ptr_eq(&chunk))
        {
            self.chunks.remove(&coord);
        }
        Some(chunk)
    }

    /// Retrieves the chunk at chunk coordinates `pos`.
    pub fn get_chunk_at(&self, pos: ChunkCoord) -> Option<MtResource<Chunk>> {
        self.chunks.get(&pos).cloned()
    }

    /// Retrieves the chunk registered at `path`.
    pub fn get_chunk_at_path(&self, path: &ChunkPath) -> Option<MtResource<Chunk>> {
        self.registry.get(path)
    }

    /// Every loaded chunk, ordered by coordinate.
    pub fn chunks(&self) -> Vec<MtResource<Chunk>> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort_by_key(|coord| (coord.x, coord.y, coord.z));
        coords
            .into_iter()
            .filter_map(|coord| self.chunks.get(&coord).cloned())
            .collect()
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Paths of the chunks spawned around the origin for a `radius`.
    ///
    /// Single-step children of the root on the `y = 0` layer, with `x` and `z` inside
    /// both `[-radius, radius]` and the step ranges.
    pub fn spawn_paths(radius: i32) -> Vec<ChunkPath> {
        let radius = radius.max(0);
        let x_range = (-radius).max(STEP_X_RANGE.0)..=radius.min(STEP_X_RANGE.1);
        let z_range = (-radius).max(STEP_Z_RANGE.0)..=radius.min(STEP_Z_RANGE.1);

        x_range
            .flat_map(|x| z_range.clone().map(move |z| ChunkPath::root().child(x, 0, z)))
            .collect()
    }

    /// Generates and adds the chunks of [`spawn_paths`](Self::spawn_paths).
    ///
    /// Returns the chunks that were newly added.
    pub fn spawn(&mut self, radius: i32) -> Vec<MtResource<Chunk>> {
        let spawned: Vec<_> = Self::spawn_paths(radius)
            .into_iter()
            .filter_map(|path| self.add_chunk_at_path(path))
            .collect();

        let filled: usize = spawned.iter().map(|chunk| chunk.get().solid_count()).sum();
        info!(
            "Spawned {} chunks ({} filled blocks)",
            spawned.len(),
            filled
        );
        spawned
    }

    /// Coordinates of the six face neighbors of `coord`.
    pub fn neighbor_coords(coord: ChunkCoord) -> [ChunkCoord; 6] {
        super::block::block_side::BlockSide::all().map(|side| side.neighbor(coord))
    }

    /// Reads the block at global block coordinates. Unloaded positions read as air.
    pub fn sample_block(&self, gx: i32, gy: i32, gz: i32) -> BlockId {
        let coord = Point3::new(
            gx.div_euclid(CHUNK_DIMENSION),
            gy.div_euclid(CHUNK_DIMENSION),
            gz.div_euclid(CHUNK_DIMENSION),
        );
        match self.chunks.get(&coord) {
            Some(chunk) => chunk.get().get(
                gx.rem_euclid(CHUNK_DIMENSION),
                gy.rem_euclid(CHUNK_DIMENSION),
                gz.rem_euclid(CHUNK_DIMENSION),
            ),
            None => AIR,
        }
    }

    /// Drops the world's references to every chunk.
    pub fn clear(&mut self) {
        debug!("Clearing {} chunks from the world", self.chunks.len());
        self.chunks.clear();
        self.registry.clear();
    }
}

impl NeighborSampler for World {
    fn sample(&self, gx: i32, gy: i32, gz: i32) -> BlockId {
        self.sample_block(gx, gy, gz)
    }
}
