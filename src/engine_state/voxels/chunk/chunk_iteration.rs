//! # Chunk Iteration Module
//!
//! This module provides an iterator for traversing all non-air blocks in a chunk in
//! storage order (`x` fastest, then `z`, then `y`), together with their chunk-local
//! positions.

use cgmath::Point3;

use crate::engine_state::voxels::block::{is_solid, BlockId};

use super::{Chunk, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};

/// An iterator over all non-air blocks in a chunk.
///
/// Air cells are skipped; each item is the block's chunk-local position and its id.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next storage index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned at the start of the chunk.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }

    /// Converts a storage index back into a chunk-local position.
    fn position_of(index: usize) -> Point3<i32> {
        let index = index as i32;
        Point3::new(
            index % CHUNK_DIMENSION,
            index / CHUNK_PLANE_SIZE,
            (index / CHUNK_DIMENSION) % CHUNK_DIMENSION,
        )
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<i32>, BlockId);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < blocks.len() {
            let index = self.current_offset;
            self.current_offset += 1;

            let id = blocks[index];
            if is_solid(id) {
                return Some((Self::position_of(index), id));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_solid_blocks_in_storage_order() {
        let mut chunk = Chunk::new(Point3::new(0, 0, 0));
        chunk.set(3, 0, 1, 2);
        chunk.set(0, 1, 0, 1);
        chunk.set(15, 15, 15, 4);

        let blocks: Vec<_> = ChunkBlockIterator::new(&chunk).collect();
        assert_eq!(
            blocks,
            vec![
                (Point3::new(3, 0, 1), 2),
                (Point3::new(0, 1, 0), 1),
                (Point3::new(15, 15, 15), 4),
            ]
        );
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let chunk = Chunk::new(Point3::new(2, 0, -1));
        assert_eq!(ChunkBlockIterator::new(&chunk).count(), 0);
    }
}
