//! # Block Module
//!
//! This module provides the block-level vocabulary of the voxel engine: the compact
//! [`BlockId`] stored in every chunk cell, the typed [`BlockType`] view over known ids,
//! the six [`BlockSide`]s a face can point to, and the closed surface table that maps
//! an id to its atlas region and tint.

use phf::phf_map;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent a block in a chunk.
///
/// `0` is air; every other value names a surface material.
pub type BlockId = u8;

/// The id used for air (absent) blocks.
pub const AIR: BlockId = 0;

/// A rectangular region of the block texture atlas, in normalized texture coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    /// Left edge of the region
    pub x: f32,
    /// Top edge of the region
    pub y: f32,
    /// Width of one tile of the region
    pub width: f32,
    /// Height of one tile of the region
    pub height: f32,
}

/// The visual surface of a block: the atlas tile it samples and the tint applied to it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockSurface {
    /// Atlas region of a single block face
    pub uv: UvRect,
    /// RGBA tint multiplied onto the texture
    pub tint: [u8; 4],
}

/// Surface used for ids missing from [`BLOCK_SURFACES`].
pub const DEFAULT_SURFACE: BlockSurface = BlockSurface {
    uv: UvRect {
        x: 0.5,
        y: 0.5,
        width: 0.5,
        height: 0.5,
    },
    tint: [255, 255, 255, 255],
};

/// Maps each known block id to its atlas region and tint.
///
/// The atlas is split into four quadrants; water is tinted semi-transparent blue.
pub static BLOCK_SURFACES: phf::Map<u8, BlockSurface> = phf_map! {
    1u8 => BlockSurface {
        uv: UvRect { x: 0.0, y: 0.0, width: 0.5, height: 0.5 },
        tint: [255, 255, 255, 255],
    },
    2u8 => BlockSurface {
        uv: UvRect { x: 0.5, y: 0.0, width: 0.5, height: 0.5 },
        tint: [200, 200, 200, 255],
    },
    3u8 => BlockSurface {
        uv: UvRect { x: 0.0, y: 0.5, width: 0.5, height: 0.5 },
        tint: [220, 180, 160, 255],
    },
    4u8 => BlockSurface {
        uv: UvRect { x: 0.5, y: 0.5, width: 0.5, height: 0.5 },
        tint: [100, 150, 255, 128],
    },
};

/// Looks up the surface of a block id.
///
/// Unknown ids degrade to [`DEFAULT_SURFACE`] rather than failing, so malformed voxel
/// data still meshes.
pub fn block_surface(id: BlockId) -> BlockSurface {
    BLOCK_SURFACES.get(&id).copied().unwrap_or(DEFAULT_SURFACE)
}

/// Returns `true` if the id names a solid (non-air) block.
#[inline]
pub fn is_solid(id: BlockId) -> bool {
    id != AIR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_use_their_table_entry() {
        let stone = block_surface(2);
        assert_eq!(stone.uv.x, 0.5);
        assert_eq!(stone.uv.y, 0.0);
        assert_eq!(stone.tint, [200, 200, 200, 255]);
        assert_eq!(block_surface(4).tint[3], 128);
    }

    #[test]
    fn unknown_ids_fall_back_to_default_surface() {
        assert_eq!(block_surface(200), DEFAULT_SURFACE);
        assert_eq!(block_surface(AIR), DEFAULT_SURFACE);
    }

    #[test]
    fn only_zero_is_air() {
        assert!(!is_solid(0));
        assert!(is_solid(1));
        assert!(is_solid(255));
    }
}
