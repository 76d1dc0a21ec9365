//! # Voxel Engine Core
//!
//! This module contains the core voxel engine functionality, providing the foundation
//! for representing, manipulating, and rendering a voxel-based world.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components:
//!
//! * **Block**: Block ids, named block types, sides and the surface table
//! * **Chunk**: Fixed-size 3D arrays of blocks, their path identity and file format
//! * **Registry**: Path-hash keyed store of live chunks
//! * **Generation**: Terrain generators that fill new chunks
//! * **World**: Coordinates chunks and provides a unified interface for the entire voxel space
//! * **Tasks**: Background chunk generation and meshing
//!
//! ## Data Flow
//!
//! 1. The world creates a chunk and fills it from its generator
//! 2. The chunk is registered under its path and its coordinate
//! 3. A mesh is compiled from the chunk and the layers of its loaded neighbors
//! 4. The compiled mesh is uploaded and owned by the chunk
//!
//! ## Thread Safety
//!
//! Chunks are shared as [`MtResource`](crate::MtResource)s. Meshing reads a chunk under
//! its read lock together with a [`ChunkNeighborhood`](neighborhood::ChunkNeighborhood)
//! snapshot, so it never holds more than one chunk lock at a time.

pub mod block;
pub mod chunk;
pub mod generation;
pub mod neighborhood;
pub mod registry;
pub mod tasks;
pub mod world;
