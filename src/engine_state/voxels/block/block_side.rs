//! # Block Side Module
//!
//! This module defines the different faces/sides of a voxel block and how they map
//! onto the principal axes used by the mesher.

use cgmath::{Point3, Vector3};

/// Represents the six possible faces of a voxel block.
///
/// Each variant corresponds to a specific face and is assigned a unique integer value
/// for compact storage.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// Maps a principal axis (0 = x, 1 = y, 2 = z) and a normal sign to a side.
    ///
    /// Any positive `sign` selects the positive-facing side.
    pub fn from_axis(axis: usize, sign: i8) -> Self {
        match (axis % 3, sign > 0) {
            (0, true) => BlockSide::RIGHT,
            (0, false) => BlockSide::LEFT,
            (1, true) => BlockSide::TOP,
            (1, false) => BlockSide::BOTTOM,
            (_, true) => BlockSide::FRONT,
            (_, false) => BlockSide::BACK,
        }
    }

    /// The principal axis this side is perpendicular to.
    pub fn axis(self) -> usize {
        match self {
            BlockSide::LEFT | BlockSide::RIGHT => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::BACK | BlockSide::FRONT => 2,
        }
    }

    /// `1` if this side faces along the positive axis, `-1` otherwise.
    pub fn sign(self) -> i8 {
        match self {
            BlockSide::RIGHT | BlockSide::TOP | BlockSide::FRONT => 1,
            BlockSide::LEFT | BlockSide::BOTTOM | BlockSide::BACK => -1,
        }
    }

    /// Offset to the neighboring block (or chunk) across this side.
    pub fn offset(self) -> Vector3<i32> {
        let mut offset = [0i32; 3];
        offset[self.axis()] = self.sign() as i32;
        Vector3::new(offset[0], offset[1], offset[2])
    }

    /// The chunk or block coordinate across this side of `coord`, wrapping at the `i32` limits.
    pub fn neighbor(self, coord: Point3<i32>) -> Point3<i32> {
        let offset = self.offset();
        Point3::new(
            coord.x.wrapping_add(offset.x),
            coord.y.wrapping_add(offset.y),
            coord.z.wrapping_add(offset.z),
        )
    }

    /// The unit outward normal of this side.
    pub fn normal(self) -> Vector3<f32> {
        match self {
            BlockSide::FRONT => Vector3::new(0.0, 0.0, 1.0),
            BlockSide::BACK => Vector3::new(0.0, 0.0, -1.0),
            BlockSide::BOTTOM => Vector3::new(0.0, -1.0, 0.0),
            BlockSide::TOP => Vector3::new(0.0, 1.0, 0.0),
            BlockSide::LEFT => Vector3::new(-1.0, 0.0, 0.0),
            BlockSide::RIGHT => Vector3::new(1.0, 0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_round_trips_through_sides() {
        for side in BlockSide::all() {
            let n = side.normal();
            let sign = if n.x + n.y + n.z > 0.0 { 1 } else { -1 };
            assert_eq!(BlockSide::from_axis(side.axis(), sign), side);
            assert_eq!(side.sign(), sign);
        }
    }

    #[test]
    fn offsets_match_normals() {
        for side in BlockSide::all() {
            let offset = side.offset();
            let normal = side.normal();
            assert_eq!(offset.x as f32, normal.x);
            assert_eq!(offset.y as f32, normal.y);
            assert_eq!(offset.z as f32, normal.z);
        }
    }

    #[test]
    fn neighbors_wrap_at_the_limits() {
        let edge = Point3::new(i32::MAX, 0, i32::MIN);
        assert_eq!(BlockSide::RIGHT.neighbor(edge), Point3::new(i32::MIN, 0, i32::MIN));
        assert_eq!(BlockSide::BACK.neighbor(edge), Point3::new(i32::MAX, 0, i32::MAX));
        assert_eq!(BlockSide::TOP.neighbor(edge), Point3::new(i32::MAX, 1, i32::MIN));
    }
}
