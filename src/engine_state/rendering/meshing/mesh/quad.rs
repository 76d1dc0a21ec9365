use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::{block_side::BlockSide, BlockId};

/// One merged rectangular face emitted by the greedy mesher.
///
/// The four corners lie in the plane perpendicular to `axis` at the slice boundary, in
/// the order `(i, j)`, `(i + width, j)`, `(i + width, j + height)`, `(i, j + height)` over
/// the two in-plane axes `u = (axis + 1) % 3` and `v = (axis + 2) % 3`. UV tiling and
/// triangle winding both depend on that order.
///
/// Quads are kept alongside the uploaded geometry for wireframe overlays and picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// Corner positions in chunk-local block space
    pub corners: [Point3<f32>; 4],
    /// The block id whose surface this face shows
    pub block_id: BlockId,
    /// Principal axis the face is perpendicular to (0 = x, 1 = y, 2 = z)
    pub axis: usize,
    /// `+1` if the face points along the positive axis, `-1` otherwise
    pub normal_sign: i8,
    /// Extent along the `u` axis, in blocks
    pub width: usize,
    /// Extent along the `v` axis, in blocks
    pub height: usize,
}

impl Quad {
    /// Builds the quad covering mask cells `i..i + width` by `j..j + height` at `plane`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        axis: usize,
        plane: i32,
        i: usize,
        j: usize,
        width: usize,
        height: usize,
        block_id: BlockId,
        normal_sign: i8,
    ) -> Self {
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;
        let bounds = [(i, j), (i + width, j), (i + width, j + height), (i, j + height)];

        let corners = bounds.map(|(cu, cv)| {
            let mut corner = [0.0f32; 3];
            corner[axis] = plane as f32;
            corner[u] = cu as f32;
            corner[v] = cv as f32;
            Point3::new(corner[0], corner[1], corner[2])
        });

        Quad {
            corners,
            block_id,
            axis,
            normal_sign,
            width,
            height,
        }
    }

    /// The block side this face represents.
    pub fn side(&self) -> BlockSide {
        BlockSide::from_axis(self.axis, self.normal_sign)
    }

    /// The unit outward normal of the face.
    pub fn normal(&self) -> Vector3<f32> {
        self.side().normal()
    }

    /// Coordinate of the face plane along its axis.
    pub fn plane(&self) -> i32 {
        self.corners[0][self.axis] as i32
    }

    /// Face area in block faces.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Mask cells `(i, j)` in the `(u, v)` plane covered by this face.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let origin = self.corners[0];
        let i0 = origin[(self.axis + 1) % 3] as usize;
        let j0 = origin[(self.axis + 2) % 3] as usize;
        let width = self.width;
        (j0..j0 + self.height).flat_map(move |j| (i0..i0 + width).map(move |i| (i, j)))
    }

    /// The same face moved by `offset`, e.g. into world space for debug overlays.
    pub fn translated(&self, offset: Vector3<f32>) -> Self {
        Quad {
            corners: self.corners.map(|corner| corner + offset),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_follow_the_mandated_order() {
        // axis y: u = z, v = x
        let quad = Quad::new(1, 3, 2, 1, 4, 2, 1, 1);
        assert_eq!(quad.corners[0], Point3::new(1.0, 3.0, 2.0));
        assert_eq!(quad.corners[1], Point3::new(1.0, 3.0, 6.0));
        assert_eq!(quad.corners[2], Point3::new(3.0, 3.0, 6.0));
        assert_eq!(quad.corners[3], Point3::new(3.0, 3.0, 2.0));
        assert_eq!(quad.plane(), 3);
        assert_eq!(quad.side(), BlockSide::TOP);
    }

    #[test]
    fn cells_cover_the_rectangle() {
        let quad = Quad::new(0, 0, 1, 2, 2, 2, 1, -1);
        let cells: Vec<_> = quad.cells().collect();
        assert_eq!(cells, vec![(1, 2), (2, 2), (1, 3), (2, 3)]);
        assert_eq!(quad.area(), 4);
        assert_eq!(quad.side(), BlockSide::LEFT);
    }

    #[test]
    fn translation_moves_every_corner() {
        let quad = Quad::new(2, 1, 0, 0, 1, 1, 2, 1);
        let moved = quad.translated(Vector3::new(16.0, 0.0, -16.0));
        for (before, after) in quad.corners.iter().zip(moved.corners.iter()) {
            assert_eq!(after.x, before.x + 16.0);
            assert_eq!(after.z, before.z - 16.0);
        }
        assert_eq!(moved.block_id, 2);
    }
}
