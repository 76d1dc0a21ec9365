//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation.
//! These tasks are processed on worker threads so that generating many chunks does not
//! stall the main thread.

pub mod chunk_generation_task;
