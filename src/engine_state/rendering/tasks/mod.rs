//! Background tasks for the rendering system.
//!
//! These tasks compile chunk geometry off the main thread. Uploading and releasing
//! geometry still happens on the main thread when their results are handled.
//!
//! # Available Tasks
//! - `ChunkMeshGenerationTask`: Compiles the greedy mesh of a chunk in the background

pub mod chunk_mesh_generation_task;
