//! Vertex data structures for chunk geometry uploads.
//!
//! The mesher produces flat attribute arrays; this module defines the interleaved
//! layout those arrays are packed into when a mesh is uploaded to a geometry store.

/// A vertex in the chunk geometry upload format.
///
/// # Memory Layout
/// - Position: 3x f32 (12 bytes)
/// - Normal: 3x f32 (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
/// - Color: RGBA u8 (4 bytes)
///
/// Total size: 36 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in chunk-local block space
    pub position: [f32; 3],
    /// Unit face normal
    pub normal: [f32; 3],
    /// Tiled atlas coordinates
    pub tex_coords: [f32; 2],
    /// RGBA tint
    pub color: [u8; 4],
}

impl Vertex {
    /// Creates a new vertex with the given attributes.
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2], color: [u8; 4]) -> Self {
        Vertex {
            position,
            normal,
            tex_coords,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_has_no_padding() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
    }
}
