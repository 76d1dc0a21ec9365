//! # Chunk Module
//!
//! This module provides the `Chunk` struct and related functionality for managing
//! 16x16x16 blocks of voxel data: dense voxel storage, the chunk's identity in the
//! world, the geometry compiled from it, and its on-disk form.
//!
//! ## Storage
//!
//! Voxels live in one dense `CHUNK_SIZE` array of [`BlockId`]s indexed
//! `x + z * S + y * S * S` (z before y). The chunk file format depends on that order.
//!
//! ## Identity
//!
//! A chunk has a [`ChunkPath`] (its authoritative address in the hierarchy) and a flat
//! [`ChunkCoord`] in chunk units. Chunks created from a coordinate sit at the root path;
//! chunks created from a path derive their coordinate from it.
//!
//! ## Geometry Ownership
//!
//! A chunk owns at most one uploaded model. Installing a new mesh uploads it before the
//! old model is dropped, and dropping the chunk releases whatever it still holds.

use std::path::Path;

use cgmath::Point3;
use log::{error, info, warn};

use super::block::{is_solid, BlockId, AIR};
use super::generation::WorldGenerator;
use crate::engine_state::geometry_state::{GeometryHandle, SharedGeometryStore};
use crate::engine_state::rendering::meshing::{Mesh, MeshError, Quad};

pub mod chunk_io;
pub mod chunk_iteration;
pub mod chunk_path;

use chunk_io::{chunk_file_path, read_chunk_file, write_chunk_file, ChunkIoError};
use chunk_iteration::ChunkBlockIterator;
use chunk_path::ChunkPath;

/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 16;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: i32 = CHUNK_DIMENSION * CHUNK_DIMENSION;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_SIZE: i32 = CHUNK_PLANE_SIZE * CHUNK_DIMENSION;

/// Position of a chunk in chunk units (not block units).
pub type ChunkCoord = Point3<i32>;

/// Geometry compiled from a chunk and currently uploaded.
#[derive(Debug)]
pub struct ChunkModel {
    geometry: GeometryHandle,
    quads: Vec<Quad>,
    vertex_count: usize,
    triangle_count: usize,
}

impl ChunkModel {
    /// The uploaded geometry.
    pub fn geometry(&self) -> &GeometryHandle {
        &self.geometry
    }

    /// The merged faces of the model, for wireframe overlays and picking.
    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// Number of vertices uploaded.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of triangles uploaded.
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }
}

/// Represents a 16x16x16 collection of voxel blocks in the world.
///
/// Chunks are the fundamental unit of world data: they are generated, meshed, saved and
/// loaded as a whole.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_world::Chunk;
///
/// let mut chunk = Chunk::new(Point3::new(0, 0, 0));
/// chunk.set(1, 2, 3, 4);
///
/// assert_eq!(chunk.get(1, 2, 3), 4);
/// assert_eq!(chunk.get(-1, 0, 0), 0);
/// assert_eq!(chunk.solid_count(), 1);
/// ```
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    path: ChunkPath,
    blocks: Box<[BlockId]>,
    model: Option<ChunkModel>,
    revision: u64,
    mesh_requests: u64,
}

impl Chunk {
    /// Creates a new, completely empty chunk at `coord` with the root path.
    pub fn new(coord: ChunkCoord) -> Self {
        Chunk {
            coord,
            path: ChunkPath::root(),
            blocks: vec![AIR; CHUNK_SIZE as usize].into_boxed_slice(),
            model: None,
            revision: 0,
            mesh_requests: 0,
        }
    }

    /// Creates a new, completely empty chunk addressed by `path`.
    pub fn with_path(path: ChunkPath) -> Self {
        let mut chunk = Self::new(Self::coord_from_path(&path));
        chunk.path = path;
        chunk
    }

    /// Resets the chunk to all air at `coord`, with the root path and no model.
    pub fn init(&mut self, coord: ChunkCoord) {
        self.blocks.fill(AIR);
        self.coord = coord;
        self.path = ChunkPath::root();
        self.model = None;
        self.revision += 1;
    }

    /// Resets the chunk to all air at `path`, deriving its flat coordinate from the path.
    pub fn init_with_path(&mut self, path: ChunkPath) {
        self.init(Self::coord_from_path(&path));
        self.path = path;
    }

    /// Folds a path into a flat coordinate, `coord = coord * 8 + step` per axis.
    ///
    /// Deep paths wrap instead of overflowing.
    pub fn coord_from_path(path: &ChunkPath) -> ChunkCoord {
        path.decoded_steps()
            .fold(ChunkCoord::new(0, 0, 0), |coord, (x, y, z)| {
                ChunkCoord::new(
                    coord.x.wrapping_mul(8).wrapping_add(x),
                    coord.y.wrapping_mul(8).wrapping_add(y),
                    coord.z.wrapping_mul(8).wrapping_add(z),
                )
            })
    }

    /// The chunk's coordinate in chunk units.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// The chunk's hierarchical address.
    pub fn path(&self) -> &ChunkPath {
        &self.path
    }

    /// Global block coordinates of the chunk's `(0, 0, 0)` corner.
    pub fn origin(&self) -> Point3<i32> {
        Self::block_origin(self.coord)
    }

    /// Global block coordinates of the `(0, 0, 0)` corner of the chunk at `coord`.
    ///
    /// Wraps at the `i32` limits, as [`Chunk::coord_from_path`] does for deep paths.
    pub fn block_origin(coord: ChunkCoord) -> Point3<i32> {
        Point3::new(
            coord.x.wrapping_mul(CHUNK_DIMENSION),
            coord.y.wrapping_mul(CHUNK_DIMENSION),
            coord.z.wrapping_mul(CHUNK_DIMENSION),
        )
    }

    /// Stable name of the chunk, used for its file.
    ///
    /// The path's hex form, or `chunk_<x>_<y>_<z>` for chunks at the root path.
    pub fn identifier(&self) -> String {
        if self.path.is_root() {
            format!("chunk_{}_{}_{}", self.coord.x, self.coord.y, self.coord.z)
        } else {
            self.path.to_hex_string()
        }
    }

    /// Counter bumped on every voxel change. Used to detect stale background meshes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Issues a ticket for a new mesh of this chunk.
    ///
    /// Only a mesh built for the latest ticket may be installed; results carrying an
    /// older ticket have been superseded.
    pub fn request_mesh(&mut self) -> u64 {
        self.mesh_requests += 1;
        self.mesh_requests
    }

    /// The most recently issued mesh ticket, `0` if none was ever issued.
    pub fn latest_mesh_request(&self) -> u64 {
        self.mesh_requests
    }

    /// Returns `true` if chunk-local `(x, y, z)` lies inside the chunk.
    #[inline]
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_DIMENSION).contains(&x)
            && (0..CHUNK_DIMENSION).contains(&y)
            && (0..CHUNK_DIMENSION).contains(&z)
    }

    #[inline]
    fn index(x: i32, y: i32, z: i32) -> usize {
        (x + z * CHUNK_DIMENSION + y * CHUNK_PLANE_SIZE) as usize
    }

    /// Gets the block at chunk-local coordinates. Out-of-range positions read as air.
    pub fn get(&self, x: i32, y: i32, z: i32) -> BlockId {
        if Self::in_bounds(x, y, z) {
            self.blocks[Self::index(x, y, z)]
        } else {
            AIR
        }
    }

    /// Sets the block at chunk-local coordinates. Out-of-range writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, z: i32, id: BlockId) {
        if Self::in_bounds(x, y, z) {
            self.blocks[Self::index(x, y, z)] = id;
            self.revision += 1;
        }
    }

    /// Sets every block of the chunk to `id`.
    pub fn fill_with(&mut self, id: BlockId) {
        self.blocks.fill(id);
        self.revision += 1;
    }

    /// Regenerates the chunk's voxels from its coordinate.
    pub fn fill_from(&mut self, generator: &dyn WorldGenerator) {
        generator.generate_chunk(self.coord, &mut self.blocks, CHUNK_DIMENSION);
        self.revision += 1;
    }

    /// The raw voxel array in storage order.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Iterates the non-air blocks with their chunk-local positions.
    pub fn solid_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// Number of non-air blocks.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|&&id| is_solid(id)).count()
    }

    /// Returns `true` if every block is air.
    pub fn is_empty(&self) -> bool {
        self.solid_count() == 0
    }

    /// Returns `true` if the chunk currently holds uploaded geometry.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// The chunk's uploaded model, if any.
    pub fn model(&self) -> Option<&ChunkModel> {
        self.model.as_ref()
    }

    /// The merged faces of the current model, empty without one.
    pub fn quads(&self) -> &[Quad] {
        match &self.model {
            Some(model) => model.quads(),
            None => &[],
        }
    }

    /// Installs `mesh` as the chunk's model.
    ///
    /// The new geometry is uploaded before the previous model is released, so a failed
    /// upload leaves the old model in place. An empty mesh releases the model.
    pub fn apply_mesh(&mut self, mesh: Mesh, store: &SharedGeometryStore) -> Result<(), MeshError> {
        if mesh.is_empty() {
            self.clear_model();
            return Ok(());
        }

        let geometry = GeometryHandle::upload(store, &mesh)?;
        self.model = Some(ChunkModel {
            geometry,
            vertex_count: mesh.vertex_count(),
            triangle_count: mesh.triangle_count(),
            quads: mesh.quads,
        });

        Ok(())
    }

    /// Releases the chunk's model, if any.
    pub fn clear_model(&mut self) {
        self.model = None;
    }

    /// Writes the chunk to `<base_dir>/<identifier>.chunk`.
    ///
    /// Failures are logged and reported as `false`.
    pub fn save(&self, base_dir: impl AsRef<Path>) -> bool {
        match self.try_save(base_dir.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to save chunk {}: {}", self.identifier(), e);
                false
            }
        }
    }

    /// Writes the chunk to `<base_dir>/<identifier>.chunk`.
    pub fn try_save(&self, base_dir: &Path) -> Result<(), ChunkIoError> {
        let path = chunk_file_path(base_dir, &self.identifier());
        write_chunk_file(&path, &self.blocks, self.coord)?;
        info!("Saved chunk {} to {}", self.identifier(), path.display());
        Ok(())
    }

    /// Replaces the chunk's voxels with `<base_dir>/<identifier>.chunk`.
    ///
    /// Failures are logged and reported as `false`; the voxels are left untouched unless
    /// the whole file validated.
    pub fn load(&mut self, base_dir: impl AsRef<Path>) -> bool {
        match self.try_load(base_dir.as_ref()) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to load chunk {}: {}", self.identifier(), e);
                false
            }
        }
    }

    /// Replaces the chunk's voxels with `<base_dir>/<identifier>.chunk`.
    ///
    /// A coordinate that differs from the chunk's own is logged but accepted.
    pub fn try_load(&mut self, base_dir: &Path) -> Result<(), ChunkIoError> {
        let path = chunk_file_path(base_dir, &self.identifier());
        let file = read_chunk_file(&path, CHUNK_SIZE as usize)?;

        if file.coord != self.coord {
            warn!(
                "Chunk file {} records coordinate {:?}, chunk is at {:?}",
                path.display(),
                file.coord,
                self.coord
            );
        }

        self.blocks.copy_from_slice(&file.blocks);
        self.revision += 1;
        info!("Loaded chunk {} from {}", self.identifier(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::engine_state::geometry_state::CpuGeometryStore;
    use crate::engine_state::rendering::meshing::{greedy_mesh, AirSampler};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("voxel_world_chunk_{}", name));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn storage_order_is_x_then_z_then_y() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        chunk.set(1, 0, 0, 1);
        chunk.set(0, 0, 1, 2);
        chunk.set(0, 1, 0, 3);
        assert_eq!(chunk.blocks()[1], 1);
        assert_eq!(chunk.blocks()[CHUNK_DIMENSION as usize], 2);
        assert_eq!(chunk.blocks()[CHUNK_PLANE_SIZE as usize], 3);
    }

    #[test]
    fn out_of_range_access_is_tolerated() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        chunk.set(CHUNK_DIMENSION, 0, 0, 1);
        chunk.set(0, -1, 0, 1);
        assert!(chunk.is_empty());
        assert_eq!(chunk.get(0, CHUNK_DIMENSION, 0), AIR);
    }

    #[test]
    fn path_identity_derives_coordinates() {
        let path = ChunkPath::root().child(1, 0, -1).child(2, -1, 0);
        let chunk = Chunk::with_path(path.clone());
        assert_eq!(chunk.coord(), ChunkCoord::new(10, -1, -8));
        assert_eq!(chunk.identifier(), "10f_2f0");
        assert_eq!(chunk.path(), &path);

        let flat = Chunk::new(ChunkCoord::new(-1, 0, 2));
        assert_eq!(flat.identifier(), "chunk_-1_0_2");
    }

    #[test]
    fn init_resets_voxels_and_identity() {
        let mut chunk = Chunk::with_path(ChunkPath::root().child(1, 1, 1));
        chunk.fill_with(2);
        chunk.init(ChunkCoord::new(3, 0, 0));
        assert!(chunk.is_empty());
        assert!(chunk.path().is_root());
        assert_eq!(chunk.coord(), ChunkCoord::new(3, 0, 0));

        chunk.init_with_path(ChunkPath::root().child(-1, 2, 0));
        assert_eq!(chunk.coord(), ChunkCoord::new(-1, 2, 0));
    }

    #[test]
    fn save_then_load_reproduces_voxels() {
        let dir = scratch_dir("save_load");
        let path = ChunkPath::root().child(0, 1, -2);

        let mut original = Chunk::with_path(path.clone());
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..500 {
            original.set(rng.i32(0..16), rng.i32(0..16), rng.i32(0..16), rng.u8(0..5));
        }
        assert!(original.save(&dir));

        let mut restored = Chunk::with_path(path);
        assert!(restored.load(&dir));
        assert_eq!(restored.blocks(), original.blocks());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_load_leaves_voxels_untouched() {
        let dir = scratch_dir("failed_load");
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        chunk.set(2, 2, 2, 3);
        assert!(!chunk.load(&dir));
        assert_eq!(chunk.get(2, 2, 2), 3);
    }

    #[test]
    fn coordinate_mismatch_is_not_fatal() {
        let dir = scratch_dir("coord_mismatch");
        let mut saved = Chunk::new(ChunkCoord::new(0, 0, 0));
        saved.set(0, 0, 0, 1);
        let file = chunk_file_path(&dir, &saved.identifier());
        write_chunk_file(&file, saved.blocks(), ChunkCoord::new(9, 9, 9)).unwrap();

        let mut loaded = Chunk::new(ChunkCoord::new(0, 0, 0));
        assert!(loaded.load(&dir));
        assert_eq!(loaded.get(0, 0, 0), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn remeshing_replaces_and_empty_mesh_releases() {
        let store = Arc::new(CpuGeometryStore::new());
        let shared: SharedGeometryStore = store.clone();

        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        chunk.set(0, 0, 0, 1);
        chunk
            .apply_mesh(greedy_mesh(&chunk, &AirSampler).unwrap(), &shared)
            .unwrap();
        let first = chunk.model().unwrap().geometry().id();
        assert_eq!(chunk.quads().len(), 6);

        chunk.set(1, 0, 0, 1);
        chunk
            .apply_mesh(greedy_mesh(&chunk, &AirSampler).unwrap(), &shared)
            .unwrap();
        let second = chunk.model().unwrap().geometry().id();
        assert_ne!(first, second);
        assert!(!store.contains(first));
        assert_eq!(store.live_count(), 1);

        chunk.fill_with(AIR);
        chunk
            .apply_mesh(greedy_mesh(&chunk, &AirSampler).unwrap(), &shared)
            .unwrap();
        assert!(!chunk.has_model());
        assert!(chunk.quads().is_empty());
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn mesh_tickets_increase() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        assert_eq!(chunk.latest_mesh_request(), 0);
        let first = chunk.request_mesh();
        let second = chunk.request_mesh();
        assert!(second > first);
        assert_eq!(chunk.latest_mesh_request(), second);
    }

    #[test]
    fn dropping_a_chunk_releases_its_geometry() {
        let store = Arc::new(CpuGeometryStore::new());
        let shared: SharedGeometryStore = store.clone();

        let mut chunk = Chunk::new(ChunkCoord::new(0, 0, 0));
        chunk.fill_with(2);
        chunk
            .apply_mesh(greedy_mesh(&chunk, &AirSampler).unwrap(), &shared)
            .unwrap();
        assert_eq!(store.live_count(), 1);

        drop(chunk);
        assert_eq!(store.live_count(), 0);
    }
}
