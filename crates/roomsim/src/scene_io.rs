//! Scene file loading and output writing.
//!
//! The scene lives in `sim_data.json` inside the simulation directory:
//! a flat object whose keys are the dataset names of [`fdtd3d::Scene`].
//! Datasets map per field, so a file may carry extra keys, but existing
//! names keep their types.

use std::fs;
use std::path::{Path, PathBuf};

use fdtd3d::{RunOutput, Scene};
use thiserror::Error;

/// File name of the scene inside `--sim_dir`.
pub const SCENE_FILE: &str = "sim_data.json";

/// Errors surfaced by the loader before the engine starts.
#[derive(Debug, Error)]
pub enum SceneLoadError {
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed scene {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot write {path}: {source}")]
    Unwritable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot serialize output for {path}: {source}")]
    Unserializable {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read and deserialize a scene file.
pub fn load_scene(path: &Path) -> Result<Scene, SceneLoadError> {
    let json = fs::read_to_string(path).map_err(|source| SceneLoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| SceneLoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize the receiver series and timings next to the scene.
pub fn write_output(path: &Path, output: &RunOutput) -> Result<(), SceneLoadError> {
    let json = serde_json::to_string_pretty(output).map_err(|source| {
        SceneLoadError::Unserializable {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, json).map_err(|source| SceneLoadError::Unwritable {
        path: path.to_path_buf(),
        source,
    })
}
