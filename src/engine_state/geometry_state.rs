//! # Geometry State Module
//!
//! This module owns the "GPU-side" half of chunk geometry: uploading a compiled
//! [`Mesh`] into a store and releasing it again when the owning chunk replaces or drops it.
//!
//! ## Key Features
//!
//! * A [`GeometryStore`] trait, so a real graphics backend can sit behind the same contract
//! * RAII [`GeometryHandle`]s: a handle releases its geometry exactly once, on drop
//! * A CPU-resident [`CpuGeometryStore`] with per-upload analytics and an optional byte budget
//!
//! ## Ownership
//!
//! A chunk holds at most one handle. Re-meshing uploads the new geometry first and only
//! then drops the old handle, so there is never a frame without geometry and never a
//! double release.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use thiserror::Error;

use crate::engine_state::rendering::meshing::Mesh;

/// Identifier of one uploaded geometry resource inside a store.
pub type GeometryId = u64;

/// Shared, thread-safe handle to whatever store uploads chunk geometry.
pub type SharedGeometryStore = Arc<dyn GeometryStore>;

/// Failure to allocate geometry for a mesh.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The store's memory budget cannot fit the upload.
    #[error("geometry budget exhausted: {requested} bytes requested, {available} bytes available")]
    BudgetExhausted {
        /// Bytes the upload needs
        requested: u64,
        /// Bytes left in the budget
        available: u64,
    },
}

/// A backend that can hold uploaded mesh geometry.
///
/// Implementations must tolerate `release` being called from any thread, since the last
/// reference to a chunk may be dropped on a worker.
pub trait GeometryStore: Send + Sync {
    /// Uploads the mesh's vertex and index buffers and returns the new resource id.
    fn upload(&self, mesh: &Mesh) -> Result<GeometryId, GeometryError>;

    /// Frees the resource. Unknown ids are ignored.
    fn release(&self, id: GeometryId);
}

/// Owning handle to one uploaded geometry resource.
///
/// The resource is released when the handle is dropped.
pub struct GeometryHandle {
    id: GeometryId,
    store: SharedGeometryStore,
}

impl GeometryHandle {
    /// Uploads `mesh` into `store` and wraps the result in an owning handle.
    pub fn upload(store: &SharedGeometryStore, mesh: &Mesh) -> Result<Self, GeometryError> {
        let id = store.upload(mesh)?;
        Ok(Self {
            id,
            store: store.clone(),
        })
    }

    /// The id of the resource inside its store.
    pub fn id(&self) -> GeometryId {
        self.id
    }
}

impl Drop for GeometryHandle {
    fn drop(&mut self) {
        self.store.release(self.id);
    }
}

impl Debug for GeometryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeometryHandle").field("id", &self.id).finish()
    }
}

/// Analytics data for one uploaded geometry resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryAnalytics {
    /// Bytes held by the vertex buffer
    pub vertex_bytes: u64,
    /// Bytes held by the index buffer
    pub index_bytes: u64,
    /// Number of vertices uploaded
    pub vertex_count: u32,
    /// Number of triangles uploaded
    pub triangle_count: u32,
}

impl GeometryAnalytics {
    /// Total bytes held by this resource.
    pub fn allocated_memory(&self) -> u64 {
        self.vertex_bytes + self.index_bytes
    }
}

struct StoredGeometry {
    vertex_data: Vec<u8>,
    index_data: Vec<u8>,
    analytics: GeometryAnalytics,
}

/// Geometry store that keeps uploaded buffers in CPU memory.
///
/// Used headless (tests, tools, servers) and as the reference implementation of the
/// [`GeometryStore`] contract. An optional byte budget makes uploads fail the way a
/// real device allocation would.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use voxel_world::{CpuGeometryStore, SharedGeometryStore};
///
/// let store = Arc::new(CpuGeometryStore::new());
/// let shared: SharedGeometryStore = store.clone();
/// assert_eq!(store.live_count(), 0);
/// # let _ = shared;
/// ```
pub struct CpuGeometryStore {
    buffers: Mutex<HashMap<GeometryId, StoredGeometry>>,
    next_id: AtomicU64,
    budget_bytes: Option<u64>,
    total_uploads: AtomicU64,
    total_releases: AtomicU64,
}

impl CpuGeometryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::with_budget(None)
    }

    /// Creates a store that refuses uploads past `budget_bytes` live bytes.
    pub fn with_budget(budget_bytes: Option<u64>) -> Self {
        Self {
            buffers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            budget_bytes,
            total_uploads: AtomicU64::new(0),
            total_releases: AtomicU64::new(0),
        }
    }

    fn buffers(&self) -> MutexGuard<'_, HashMap<GeometryId, StoredGeometry>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of resources currently uploaded and not yet released.
    pub fn live_count(&self) -> usize {
        self.buffers().len()
    }

    /// Returns `true` if `id` is currently uploaded.
    pub fn contains(&self, id: GeometryId) -> bool {
        self.buffers().contains_key(&id)
    }

    /// Analytics of a live resource.
    pub fn analytics(&self, id: GeometryId) -> Option<GeometryAnalytics> {
        self.buffers().get(&id).map(|stored| stored.analytics)
    }

    /// Raw vertex bytes of a live resource (interleaved [`Vertex`](crate::Vertex) data).
    pub fn vertex_data(&self, id: GeometryId) -> Option<Vec<u8>> {
        self.buffers().get(&id).map(|stored| stored.vertex_data.clone())
    }

    /// Raw index bytes of a live resource (`u16` triangle list).
    pub fn index_data(&self, id: GeometryId) -> Option<Vec<u8>> {
        self.buffers().get(&id).map(|stored| stored.index_data.clone())
    }

    /// Gets the total allocated memory across all live resources.
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.buffers()
            .values()
            .fold(0, |acc, stored| acc + stored.analytics.allocated_memory())
    }

    /// Number of uploads that succeeded over the store's lifetime.
    pub fn total_uploads(&self) -> u64 {
        self.total_uploads.load(Ordering::Relaxed)
    }

    /// Number of releases of live resources over the store's lifetime.
    pub fn total_releases(&self) -> u64 {
        self.total_releases.load(Ordering::Relaxed)
    }
}

impl Default for CpuGeometryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryStore for CpuGeometryStore {
    fn upload(&self, mesh: &Mesh) -> Result<GeometryId, GeometryError> {
        let vertices = mesh.interleaved_vertices();
        let vertex_data: Vec<u8> = bytemuck::cast_slice(&vertices).to_vec();
        let index_data: Vec<u8> = bytemuck::cast_slice(&mesh.indices).to_vec();
        let requested = (vertex_data.len() + index_data.len()) as u64;

        let mut buffers = self.buffers();
        if let Some(budget) = self.budget_bytes {
            let in_use = buffers
                .values()
                .fold(0, |acc, stored| acc + stored.analytics.allocated_memory());
            let available = budget.saturating_sub(in_use);
            if requested > available {
                warn!(
                    "Geometry upload of {} bytes refused, {} bytes left in budget",
                    requested, available
                );
                return Err(GeometryError::BudgetExhausted {
                    requested,
                    available,
                });
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let analytics = GeometryAnalytics {
            vertex_bytes: vertex_data.len() as u64,
            index_bytes: index_data.len() as u64,
            vertex_count: mesh.vertex_count() as u32,
            triangle_count: mesh.triangle_count() as u32,
        };
        buffers.insert(
            id,
            StoredGeometry {
                vertex_data,
                index_data,
                analytics,
            },
        );
        self.total_uploads.fetch_add(1, Ordering::Relaxed);
        debug!("Uploaded geometry {} ({} bytes)", id, requested);

        Ok(id)
    }

    fn release(&self, id: GeometryId) {
        if self.buffers().remove(&id).is_some() {
            self.total_releases.fetch_add(1, Ordering::Relaxed);
            debug!("Released geometry {}", id);
        }
    }
}
