//! # World Generation Module
//!
//! Terrain generators fill a chunk's voxel array from its chunk coordinate. Every
//! generator implements the single-method [`WorldGenerator`] trait, so the world can
//! switch strategies at configuration time without knowing their internals.
//!
//! ## Generation Strategies
//!
//! - [`HeightmapGenerator`]: rolling hills from summed sine waves
//! - [`PerlinGenerator`]: 3D Perlin noise with caves and overhangs
//! - [`RandomGenerator`]: sparse random dirt, for testing
//! - [`UniformGenerator`]: every block the same (solid or empty chunks)

use cgmath::Point3;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::block::{block_type::BlockType, BlockId, AIR};
use super::chunk::ChunkCoord;

/// Fills a chunk's voxels from its coordinate.
///
/// `out_blocks` holds `chunk_size³` cells in storage order
/// (`index = x + z * chunk_size + y * chunk_size * chunk_size`). Implementations overwrite
/// every cell.
pub trait WorldGenerator: Send + Sync {
    /// Generates the chunk at `coord` into `out_blocks`.
    fn generate_chunk(&self, coord: ChunkCoord, out_blocks: &mut [BlockId], chunk_size: i32);
}

/// The generation strategies selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// [`HeightmapGenerator`]
    Heightmap,
    /// [`PerlinGenerator`]
    Perlin,
    /// [`RandomGenerator`]
    Random,
    /// [`UniformGenerator`] filled with dirt
    Solid,
    /// [`UniformGenerator`] filled with air
    Empty,
}

impl GeneratorKind {
    /// Builds the generator this kind names.
    pub fn build(self, seed: u32) -> Box<dyn WorldGenerator> {
        match self {
            GeneratorKind::Heightmap => Box::new(HeightmapGenerator::default()),
            GeneratorKind::Perlin => Box::new(PerlinGenerator::new(seed)),
            GeneratorKind::Random => Box::new(RandomGenerator::new(seed as u64)),
            GeneratorKind::Solid => Box::new(UniformGenerator::new(BlockType::DIRT.id())),
            GeneratorKind::Empty => Box::new(UniformGenerator::new(AIR)),
        }
    }
}

#[inline]
fn block_index(x: i32, y: i32, z: i32, chunk_size: i32) -> usize {
    (x + z * chunk_size + y * chunk_size * chunk_size) as usize
}

/// World block coordinate of `local` inside chunk `chunk` along one axis.
///
/// Wraps like chunk coordinates derived from deep paths do.
fn world_coord(chunk: i32, local: i32, chunk_size: i32) -> i32 {
    chunk.wrapping_mul(chunk_size).wrapping_add(local)
}

/// Deterministic heightfield made of summed sine waves.
///
/// Columns are filled with dirt up to and including `floor(base + noise * amplitude)`.
#[derive(Debug, Clone, Copy)]
pub struct HeightmapGenerator {
    /// Elevation of the heightfield's midline, in blocks
    pub base: f32,
    /// Peak deviation from the midline, in blocks
    pub amplitude: f32,
}

impl Default for HeightmapGenerator {
    fn default() -> Self {
        Self {
            base: 4.0,
            amplitude: 6.0,
        }
    }
}

impl HeightmapGenerator {
    fn pseudo_noise(x: i32, z: i32) -> f32 {
        let fx = x as f32;
        let fz = z as f32;
        ((fx * 0.12).sin() + (fz * 0.08).sin() * 0.8 + ((fx + fz) * 0.05).sin() * 0.5) * 0.5
    }

    /// Surface height of the world column at block coordinates `(wx, wz)`.
    pub fn sample_height(&self, wx: i32, wz: i32) -> f32 {
        self.base + Self::pseudo_noise(wx, wz) * self.amplitude
    }
}

impl WorldGenerator for HeightmapGenerator {
    fn generate_chunk(&self, coord: ChunkCoord, out_blocks: &mut [BlockId], chunk_size: i32) {
        out_blocks.fill(AIR);

        for lx in 0..chunk_size {
            for lz in 0..chunk_size {
                let wx = world_coord(coord.x, lx, chunk_size);
                let wz = world_coord(coord.z, lz, chunk_size);
                let height = self.sample_height(wx, wz).floor() as i32;

                for y in 0..chunk_size {
                    if world_coord(coord.y, y, chunk_size) <= height {
                        out_blocks[block_index(lx, y, lz, chunk_size)] = BlockType::DIRT.id();
                    }
                }
            }
        }
    }
}

/// Threshold above which Perlin noise is considered solid for terrain generation.
pub const PERLIN_POSITIVE_THRESHOLD: f64 = 0.2;
/// Threshold below which Perlin noise is considered solid for terrain generation.
pub const PERLIN_NEGATIVE_THRESHOLD: f64 = -0.2;
/// Scaling factor applied to world coordinates when sampling Perlin noise.
pub const PERLIN_SCALE_FACTOR: f64 = 0.02;

/// Terrain from 3D Perlin noise.
///
/// Blocks whose sample falls outside the `[-0.2, 0.2]` band are solid; the band itself
/// carves the caves.
pub struct PerlinGenerator {
    perlin: Perlin,
    seed: u32,
}

impl PerlinGenerator {
    /// Creates a generator sampling Perlin noise seeded with `seed`.
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    /// Converts world-space block coordinates to scaled noise-space coordinates.
    fn to_perlin_pos(pos: Point3<i32>, scale_factor: f64) -> [f64; 3] {
        [
            (pos.x as f64 * scale_factor),
            (pos.y as f64 * scale_factor),
            (pos.z as f64 * scale_factor),
        ]
    }

    /// Picks the material of a solid block, varying deterministically with position.
    fn material_at(&self, pos: Point3<i32>) -> BlockId {
        let hash = (pos.x as u32)
            .wrapping_mul(73_856_093)
            ^ (pos.y as u32).wrapping_mul(19_349_663)
            ^ (pos.z as u32).wrapping_mul(83_492_791)
            ^ self.seed;
        1 + (hash % 3) as BlockId
    }
}

impl WorldGenerator for PerlinGenerator {
    fn generate_chunk(&self, coord: ChunkCoord, out_blocks: &mut [BlockId], chunk_size: i32) {
        for y in 0..chunk_size {
            for z in 0..chunk_size {
                for x in 0..chunk_size {
                    let world_pos = Point3::new(
                        world_coord(coord.x, x, chunk_size),
                        world_coord(coord.y, y, chunk_size),
                        world_coord(coord.z, z, chunk_size),
                    );
                    let sample = self
                        .perlin
                        .get(Self::to_perlin_pos(world_pos, PERLIN_SCALE_FACTOR));

                    out_blocks[block_index(x, y, z, chunk_size)] =
                        if !(PERLIN_NEGATIVE_THRESHOLD..=PERLIN_POSITIVE_THRESHOLD).contains(&sample) {
                            self.material_at(world_pos)
                        } else {
                            AIR
                        };
                }
            }
        }
    }
}

/// Sparse random dirt. The pattern depends only on the seed and the chunk coordinate.
#[derive(Debug, Clone, Copy)]
pub struct RandomGenerator {
    seed: u64,
    /// Probability that a block is air
    pub sparseness: f64,
}

impl RandomGenerator {
    /// Creates a generator with the default sparseness of `0.9`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            sparseness: 0.9,
        }
    }
}

impl WorldGenerator for RandomGenerator {
    fn generate_chunk(&self, coord: ChunkCoord, out_blocks: &mut [BlockId], _chunk_size: i32) {
        let chunk_seed = self.seed
            ^ (coord.x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (coord.y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
            ^ (coord.z as u64).wrapping_mul(0x1656_67B1_9E37_79F9);
        let mut rng = fastrand::Rng::with_seed(chunk_seed);

        for block in out_blocks.iter_mut() {
            *block = if rng.f64() < self.sparseness {
                AIR
            } else {
                BlockType::DIRT.id()
            };
        }
    }
}

/// Fills every block with the same id.
#[derive(Debug, Clone, Copy)]
pub struct UniformGenerator {
    block: BlockId,
}

impl UniformGenerator {
    /// Creates a generator that fills chunks with `block`.
    pub fn new(block: BlockId) -> Self {
        Self { block }
    }
}

impl WorldGenerator for UniformGenerator {
    fn generate_chunk(&self, _coord: ChunkCoord, out_blocks: &mut [BlockId], _chunk_size: i32) {
        out_blocks.fill(self.block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::{CHUNK_DIMENSION, CHUNK_SIZE};

    fn generate(generator: &dyn WorldGenerator, coord: ChunkCoord) -> Vec<BlockId> {
        let mut blocks = vec![0xFF; CHUNK_SIZE as usize];
        generator.generate_chunk(coord, &mut blocks, CHUNK_DIMENSION);
        blocks
    }

    #[test]
    fn heightmap_fills_columns_from_the_bottom() {
        let generator = HeightmapGenerator::default();
        let blocks = generate(&generator, ChunkCoord::new(0, 0, 0));

        for x in 0..CHUNK_DIMENSION {
            for z in 0..CHUNK_DIMENSION {
                let height = generator.sample_height(x, z).floor() as i32;
                for y in 0..CHUNK_DIMENSION {
                    let expected = if y <= height { 1 } else { 0 };
                    assert_eq!(blocks[block_index(x, y, z, CHUNK_DIMENSION)], expected);
                }
            }
        }
    }

    #[test]
    fn heightmap_leaves_high_chunks_empty() {
        let blocks = generate(&HeightmapGenerator::default(), ChunkCoord::new(0, 1, 0));
        assert!(blocks.iter().all(|&id| id == AIR));
    }

    #[test]
    fn perlin_is_deterministic_per_seed() {
        let a = generate(&PerlinGenerator::new(3), ChunkCoord::new(1, 0, -1));
        let b = generate(&PerlinGenerator::new(3), ChunkCoord::new(1, 0, -1));
        assert_eq!(a, b);
        assert!(a.iter().all(|&id| id <= 3));
    }

    #[test]
    fn random_depends_on_coordinate() {
        let generator = RandomGenerator::new(11);
        let a = generate(&generator, ChunkCoord::new(0, 0, 0));
        let b = generate(&generator, ChunkCoord::new(0, 0, 0));
        let c = generate(&generator, ChunkCoord::new(1, 0, 0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|&id| id == AIR || id == 1));
    }

    #[test]
    fn generators_accept_extreme_coordinates() {
        let far = ChunkCoord::new(i32::MAX, i32::MIN, i32::MAX - 3);
        for kind in [GeneratorKind::Heightmap, GeneratorKind::Perlin, GeneratorKind::Random] {
            let blocks = generate(kind.build(5).as_ref(), far);
            assert_eq!(blocks.len(), CHUNK_SIZE as usize);
        }
    }

    #[test]
    fn kinds_deserialize_from_lowercase_names() {
        let kind: GeneratorKind = serde_json::from_str("\"perlin\"").unwrap();
        assert_eq!(kind, GeneratorKind::Perlin);
        let blocks = generate(GeneratorKind::Solid.build(0).as_ref(), ChunkCoord::new(0, 0, 0));
        assert!(blocks.iter().all(|&id| id == 1));
    }
}
