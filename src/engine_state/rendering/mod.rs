//! # Rendering Module
//!
//! Everything between voxel data and a renderer: the greedy mesher, the interleaved
//! vertex format meshes are uploaded in, and the background meshing task.
//!
//! Drawing itself is left to whoever consumes [`EngineState::draw_list`](crate::EngineState::draw_list).

pub mod meshing;
pub mod tasks;
mod vertex;

pub use vertex::Vertex;
