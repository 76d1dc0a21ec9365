//! # Chunk Registry Module
//!
//! The registry tracks which chunks are alive, keyed by [`ChunkPath::hash`]. It holds
//! shared references, so a chunk also referenced from the world's flat coordinate map
//! lives until the last holder drops it.
//!
//! ## Collisions
//!
//! The 32-bit path hash can collide. Every entry also stores its full path: a path whose
//! hash is taken by a different path is refused at registration, and lookups only
//! answer for an exact path match, so colliding paths never alias each other.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use crate::core::MtResource;

use super::chunk::{chunk_path::ChunkPath, Chunk};

struct RegistryEntry {
    path: ChunkPath,
    chunk: MtResource<Chunk>,
}

/// Thread-safe store of live chunks keyed by path hash.
///
/// # Examples
///
/// ```
/// use voxel_world::{Chunk, ChunkPath, ChunkRegistry, MtResource};
///
/// let registry = ChunkRegistry::new();
/// let path = ChunkPath::root().child(1, 0, 0);
///
/// assert!(registry.add(MtResource::new(Chunk::with_path(path.clone()))));
/// assert!(!registry.add(MtResource::new(Chunk::with_path(path.clone()))));
/// assert!(registry.contains(&path));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Default)]
pub struct ChunkRegistry {
    entries: Mutex<HashMap<u32, RegistryEntry>>,
}

impl ChunkRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<u32, RegistryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `chunk` under its path's hash.
    ///
    /// Returns `false` and leaves the registry unchanged if the hash is already taken,
    /// whether by the same path or by a colliding one.
    pub fn add(&self, chunk: MtResource<Chunk>) -> bool {
        let path = chunk.get().path().clone();
        let hash = path.hash();

        let mut entries = self.entries();
        if let Some(existing) = entries.get(&hash) {
            if existing.path == path {
                warn!("Chunk {} is already registered", path);
            } else {
                warn!(
                    "Chunk {} collides with registered chunk {} (hash {:#010x})",
                    path, existing.path, hash
                );
            }
            return false;
        }

        debug!("Registered chunk {} (hash {:#010x})", path, hash);
        entries.insert(hash, RegistryEntry { path, chunk });
        true
    }

    /// Unregisters and returns the chunk at `path`.
    pub fn remove(&self, path: &ChunkPath) -> Option<MtResource<Chunk>> {
        let mut entries = self.entries();
        let hash = path.hash();
        match entries.get(&hash) {
            Some(entry) if entry.path == *path => entries.remove(&hash).map(|entry| entry.chunk),
            _ => None,
        }
    }

    /// Looks up the chunk at `path`.
    pub fn get(&self, path: &ChunkPath) -> Option<MtResource<Chunk>> {
        self.entries()
            .get(&path.hash())
            .filter(|entry| entry.path == *path)
            .map(|entry| entry.chunk.clone())
    }

    /// Returns `true` if a chunk is registered at exactly `path`.
    pub fn contains(&self, path: &ChunkPath) -> bool {
        self.entries()
            .get(&path.hash())
            .is_some_and(|entry| entry.path == *path)
    }

    /// Snapshot of every registered chunk, in no particular order.
    pub fn get_all(&self) -> Vec<MtResource<Chunk>> {
        self.entries()
            .values()
            .map(|entry| entry.chunk.clone())
            .collect()
    }

    /// Unregisters every chunk.
    pub fn clear(&self) {
        let mut entries = self.entries();
        let count = entries.len();
        entries.clear();
        info!("Chunk registry cleared ({} chunks removed)", count);
    }

    /// Number of registered chunks.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` if no chunk is registered.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_at(path: ChunkPath) -> MtResource<Chunk> {
        MtResource::new(Chunk::with_path(path))
    }

    #[test]
    fn duplicate_add_keeps_the_original() {
        let registry = ChunkRegistry::new();
        let path = ChunkPath::root().child(1, 2, 0);

        let original = chunk_at(path.clone());
        original.get_mut().set(0, 0, 0, 3);
        assert!(registry.add(original));

        let duplicate = chunk_at(path.clone());
        assert!(!registry.add(duplicate));

        let stored = registry.get(&path).unwrap();
        assert_eq!(stored.get().get(0, 0, 0), 3);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn colliding_paths_do_not_alias() {
        let registry = ChunkRegistry::new();
        let first = ChunkPath::from_steps(vec![0, 31]);
        let second = ChunkPath::from_steps(vec![1, 0]);
        assert_eq!(first.hash(), second.hash());

        assert!(registry.add(chunk_at(first.clone())));
        assert!(!registry.add(chunk_at(second.clone())));
        assert!(registry.get(&second).is_none());
        assert!(!registry.contains(&second));
        assert!(registry.remove(&second).is_none());
        assert!(registry.contains(&first));
    }

    #[test]
    fn remove_hands_back_the_chunk() {
        let registry = ChunkRegistry::new();
        let path = ChunkPath::root().child(-1, 0, 1);
        registry.add(chunk_at(path.clone()));

        let removed = registry.remove(&path).unwrap();
        assert_eq!(removed.get().path(), &path);
        assert!(registry.is_empty());
        assert!(registry.remove(&path).is_none());
    }

    #[test]
    fn get_all_and_clear() {
        let registry = ChunkRegistry::new();
        for x in -2..2 {
            assert!(registry.add(chunk_at(ChunkPath::root().child(x, 0, 0))));
        }
        assert_eq!(registry.get_all().len(), 4);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get_all().is_empty());
    }

    #[test]
    fn shared_ownership_outlives_removal() {
        let registry = ChunkRegistry::new();
        let path = ChunkPath::root().child(0, 0, 1);
        let chunk = chunk_at(path.clone());
        registry.add(chunk.clone());
        registry.clear();
        assert_eq!(chunk.get().path(), &path);
    }
}
