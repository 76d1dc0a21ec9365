//! # Block Type Module
//!
//! This module defines the named block types of the voxel world.
//! It provides conversion between the compact [`BlockId`] stored in chunks and the
//! typed enum.

use std::fmt;

use num_derive::FromPrimitive;

use super::{block_surface, BlockId, BlockSurface};

/// Enumerates the block types the engine knows a surface for.
///
/// The discriminant is the [`BlockId`] written into chunk storage and chunk files.
/// The `FromPrimitive` derive allows conversion from raw ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockType {
    /// An air block, which is non-solid and transparent.
    AIR = 0,

    /// A basic dirt block; the terrain generators fill with this.
    DIRT = 1,

    /// A grey stone block.
    STONE = 2,

    /// A reddish clay block.
    CLAY = 3,

    /// Water, rendered with a semi-transparent tint.
    WATER = 4,
}

impl BlockType {
    /// Converts a raw id to a `BlockType`.
    ///
    /// # Returns
    /// `None` for ids without a named type. Such ids are still valid voxel data and
    /// mesh with the default surface.
    pub fn from_id(id: BlockId) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// The raw id stored in chunks for this type.
    pub fn id(self) -> BlockId {
        self as BlockId
    }

    /// The atlas region and tint of this type.
    pub fn surface(self) -> BlockSurface {
        block_surface(self.id())
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_convert_both_ways() {
        for block_type in [
            BlockType::AIR,
            BlockType::DIRT,
            BlockType::STONE,
            BlockType::CLAY,
            BlockType::WATER,
        ] {
            assert_eq!(BlockType::from_id(block_type.id()), Some(block_type));
        }
        assert_eq!(BlockType::from_id(42), None);
    }

    #[test]
    fn named_types_use_their_table_surface() {
        assert_eq!(BlockType::WATER.surface().tint, [100, 150, 255, 128]);
        assert_eq!(BlockType::DIRT.surface(), block_surface(1));
    }
}
