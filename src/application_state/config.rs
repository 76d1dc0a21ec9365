//! # Engine Configuration
//!
//! Start-up settings for the engine, read from a JSON file. Every field has a default,
//! so a partial file (or no file at all) still yields a usable configuration.
//!
//! ```json
//! {
//!     "save_directory": "saves",
//!     "spawn_radius": 2,
//!     "generator": "perlin",
//!     "seed": 7,
//!     "mesh_workers": 4
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine_state::voxels::generation::GeneratorKind;

/// Failure to read a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// The file is not valid configuration JSON.
    #[error("invalid config {path}: {source}")]
    Json {
        /// File that was parsed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// Settings the engine is started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory chunk files are saved to and loaded from
    pub save_directory: PathBuf,
    /// Half-width, in chunks, of the area spawned around the origin
    pub spawn_radius: i32,
    /// Strategy used to fill new chunks
    pub generator: GeneratorKind,
    /// Seed for the seeded generators
    pub seed: u32,
    /// Background meshing threads; `0` meshes inline on the calling thread
    pub mesh_workers: usize,
    /// Upper bound on uploaded geometry, unbounded if absent
    pub geometry_budget_bytes: Option<u64>,
    /// `env_logger` filter applied on top of `RUST_LOG`
    pub log_filter: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            save_directory: PathBuf::from("saves"),
            spawn_radius: 1,
            generator: GeneratorKind::Heightmap,
            seed: 0,
            mesh_workers: 0,
            geometry_budget_bytes: None,
            log_filter: None,
        }
    }
}

impl EngineConfig {
    /// Reads the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Uses the first of `candidates` that exists and parses, else the defaults.
    ///
    /// Missing files are skipped quietly; files that exist but fail to parse are logged.
    pub fn load_or_default<P: AsRef<Path>>(candidates: &[P]) -> Self {
        for candidate in candidates {
            let candidate = candidate.as_ref();
            if !candidate.exists() {
                continue;
            }
            match Self::load(candidate) {
                Ok(config) => {
                    info!("Loaded config from {}", candidate.display());
                    return config;
                }
                Err(e) => warn!("{}", e),
            }
        }

        info!("No config found, using defaults");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = EngineConfig::from_json(
            r#"{ "generator": "empty", "mesh_workers": 3, "geometry_budget_bytes": 1024 }"#,
        )
        .unwrap();
        assert_eq!(config.generator, GeneratorKind::Empty);
        assert_eq!(config.mesh_workers, 3);
        assert_eq!(config.geometry_budget_bytes, Some(1024));
        assert_eq!(config.spawn_radius, 1);
    }

    #[test]
    fn unknown_generator_is_rejected() {
        assert!(EngineConfig::from_json(r#"{ "generator": "fractal" }"#).is_err());
    }

    #[test]
    fn missing_and_broken_candidates_fall_back() {
        let dir = std::env::temp_dir().join("voxel_world_config_fallback");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let broken = dir.join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        let good = dir.join("good.json");
        fs::write(&good, r#"{ "seed": 11 }"#).unwrap();

        let config = EngineConfig::load_or_default(&[dir.join("missing.json"), broken.clone()]);
        assert_eq!(config, EngineConfig::default());

        let config = EngineConfig::load_or_default(&[broken, good]);
        assert_eq!(config.seed, 11);

        let _ = fs::remove_dir_all(&dir);
    }
}
