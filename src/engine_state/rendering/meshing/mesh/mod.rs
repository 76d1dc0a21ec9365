//! Mesh generation and manipulation for voxel rendering.
//!
//! This module provides the core functionality for converting voxel data into
//! upload-ready triangle meshes. It implements greedy meshing to reduce the number of
//! vertices and faces by combining coplanar faces with the same block id.
//!
//! # Architecture
//! - [`Mesh`]: flat vertex attribute buffers, a 16-bit index list and the merged quads
//! - [`Quad`]: one merged rectangular face with its corners, side and extent
//! - [`NeighborSampler`]: how the mesher sees blocks beyond the chunk boundary
//! - [`greedy_mesh`]: the compiler from a chunk's voxels to a [`Mesh`]
//!
//! # Usage
//! ```
//! use cgmath::Point3;
//! use voxel_world::{greedy_mesh, AirSampler, Chunk};
//!
//! let mut chunk = Chunk::new(Point3::new(0, 0, 0));
//! chunk.set(1, 1, 1, 2);
//!
//! let mesh = greedy_mesh(&chunk, &AirSampler).unwrap();
//! assert_eq!(mesh.quad_count(), 6);
//! ```

mod greedy;
mod mesh;
mod quad;
mod sampler;

pub use greedy::greedy_mesh;
pub use mesh::*;
pub use quad::Quad;
pub use sampler::{AirSampler, NeighborSampler};
