//! Mesh data structures and operations for chunk geometry.
//!
//! This module provides the buffers the greedy mesher writes into and the conversion
//! from those flat buffers to the interleaved upload format.

use thiserror::Error;

use crate::engine_state::geometry_state::GeometryError;
use crate::engine_state::rendering::Vertex;
use crate::engine_state::voxels::block::BlockSurface;

use super::quad::Quad;

/// Number of vertices a 16-bit index buffer can address.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Failure to produce or install chunk geometry.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The mesh needs more vertices than a 16-bit index buffer can address.
    #[error("mesh needs {vertices} vertices, more than a 16-bit index buffer can address")]
    IndexOverflow {
        /// Vertex count the mesh would reach
        vertices: usize,
    },
    /// The geometry store could not hold the mesh.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Triangle-list geometry for one chunk.
///
/// Attributes are stored as flat arrays: 3 floats per vertex position and normal,
/// 2 floats per UV and 4 bytes per RGBA color. `quads` holds one entry per merged face,
/// in emission order, for debug overlays and picking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions, `[x, y, z]` per vertex
    pub vertices: Vec<f32>,
    /// Vertex normals, `[x, y, z]` per vertex
    pub normals: Vec<f32>,
    /// Tiled texture coordinates, `[u, v]` per vertex
    pub uvs: Vec<f32>,
    /// Vertex tints, `[r, g, b, a]` per vertex
    pub colors: Vec<u8>,
    /// Triangle list indices
    pub indices: Vec<u16>,
    /// The merged faces this mesh was built from
    pub quads: Vec<Quad>,
}

impl Mesh {
    /// Creates a new, empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh with room for `quads` faces.
    pub fn with_quad_capacity(quads: usize) -> Self {
        Mesh {
            vertices: Vec::with_capacity(quads * 12),
            normals: Vec::with_capacity(quads * 12),
            uvs: Vec::with_capacity(quads * 8),
            colors: Vec::with_capacity(quads * 16),
            indices: Vec::with_capacity(quads * 6),
            quads: Vec::with_capacity(quads),
        }
    }

    /// Returns `true` if the mesh has no faces.
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of merged faces in the mesh.
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Appends the four vertices and two triangles of `quad`.
    ///
    /// The surface's atlas tile is repeated `width` by `height` times across the face
    /// instead of being stretched. Triangles wind `(0, 1, 2), (0, 2, 3)` for positive
    /// normals and `(0, 2, 1), (0, 3, 2)` for negative ones, so every face is front-facing.
    pub fn push_quad(&mut self, quad: Quad, surface: &BlockSurface) -> Result<(), MeshError> {
        let base = self.vertex_count();
        if base + 4 > MAX_VERTICES {
            return Err(MeshError::IndexOverflow {
                vertices: base + 4,
            });
        }
        let base = base as u16;

        let normal = quad.normal();
        let u0 = surface.uv.x;
        let v0 = surface.uv.y;
        let u1 = surface.uv.x + surface.uv.width * quad.width as f32;
        let v1 = surface.uv.y + surface.uv.height * quad.height as f32;
        let tex_coords = [[u0, v0], [u1, v0], [u1, v1], [u0, v1]];

        for (corner, uv) in quad.corners.iter().zip(tex_coords.iter()) {
            self.vertices.extend_from_slice(&[corner.x, corner.y, corner.z]);
            self.normals.extend_from_slice(&[normal.x, normal.y, normal.z]);
            self.uvs.extend_from_slice(uv);
            self.colors.extend_from_slice(&surface.tint);
        }

        let winding: [u16; 6] = if quad.normal_sign > 0 {
            [0, 1, 2, 0, 2, 3]
        } else {
            [0, 2, 1, 0, 3, 2]
        };
        self.indices.extend(winding.iter().map(|offset| base + offset));
        self.quads.push(quad);

        Ok(())
    }

    /// Packs the flat attribute arrays into the interleaved upload format.
    pub fn interleaved_vertices(&self) -> Vec<Vertex> {
        (0..self.vertex_count())
            .map(|n| {
                Vertex::new(
                    [self.vertices[n * 3], self.vertices[n * 3 + 1], self.vertices[n * 3 + 2]],
                    [self.normals[n * 3], self.normals[n * 3 + 1], self.normals[n * 3 + 2]],
                    [self.uvs[n * 2], self.uvs[n * 2 + 1]],
                    [
                        self.colors[n * 4],
                        self.colors[n * 4 + 1],
                        self.colors[n * 4 + 2],
                        self.colors[n * 4 + 3],
                    ],
                )
            })
            .collect()
    }
}
