//! Model registry for persisting trained artifacts by run id.
//!
//! # Storage Format
//!
//! Each run is stored as `{registry_dir}/{run_id}.json`. A single entry named
//! `active` marks the run eligible for serving. It is a relative symlink to
//! the run's artifact, or a full copy of it on hosts where symlinks are not
//! available.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use housing_model::RunId;

use crate::error::{RegistryError, Result};
use crate::io::{read_json, temp_sibling, write_json};

const ARTIFACT_EXTENSION: &str = "json";
const ACTIVE_NAME: &str = "active";

/// Directory-backed store of model artifacts with one active pointer.
///
/// Saves under distinct run ids never touch the same file. Concurrent
/// `set_active` calls race on the pointer and the last rename wins.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    dir: PathBuf,
}

impl ModelRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Artifact location for `run_id`. Pure function of the id.
    pub fn model_path(&self, run_id: &RunId) -> PathBuf {
        self.dir
            .join(format!("{}.{ARTIFACT_EXTENSION}", run_id.as_str()))
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_NAME)
    }

    /// Serializes `model` under `run_id`, replacing any previous artifact
    /// for the same id.
    pub fn save<T: Serialize>(&self, model: &T, run_id: &RunId) -> Result<PathBuf> {
        let path = self.model_path(run_id);
        write_json(&path, model)?;
        info!(run_id = %run_id, path = %path.display(), "saved model artifact");
        Ok(path)
    }

    /// Points `active` at the artifact for `run_id`.
    ///
    /// The new pointer is built under a temporary name and renamed over the
    /// old one, so readers never observe a partially written pointer.
    pub fn set_active(&self, run_id: &RunId) -> Result<PathBuf> {
        let model_path = self.model_path(run_id);
        if !model_path.is_file() {
            return Err(RegistryError::ArtifactNotFound {
                run_id: run_id.clone(),
                path: model_path,
            });
        }

        let active = self.active_path();
        let temp_path = temp_sibling(&active);
        remove_if_present(&temp_path)?;

        let linked = match link(&model_path, &temp_path) {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    error = %error,
                    "symlink unavailable, copying artifact to active pointer"
                );
                remove_if_present(&temp_path)?;
                copy_synced(&model_path, &temp_path)?;
                false
            }
        };

        if let Err(source) = fs::rename(&temp_path, &active) {
            let _ = fs::remove_file(&temp_path);
            return Err(RegistryError::Io {
                operation: "rename",
                path: active,
                source,
            });
        }

        info!(run_id = %run_id, symlink = linked, "activated model");
        Ok(active)
    }

    /// Path of the artifact currently marked active.
    ///
    /// A symlink resolves to its target inside the registry directory; a
    /// copied pointer resolves to the `active` entry itself. A dangling link
    /// counts as no active model.
    pub fn resolve_active(&self) -> Result<PathBuf> {
        let active = self.active_path();
        if !active.exists() {
            return Err(RegistryError::NoActiveModel {
                dir: self.dir.clone(),
            });
        }

        let metadata =
            fs::symlink_metadata(&active).map_err(RegistryError::io("inspect", &active))?;
        if !metadata.file_type().is_symlink() {
            debug!(path = %active.display(), "active pointer is a copy");
            return Ok(active);
        }

        let target = fs::read_link(&active).map_err(RegistryError::io("read link", &active))?;
        Ok(if target.is_absolute() {
            target
        } else {
            self.dir.join(target)
        })
    }

    /// Deserializes an artifact previously written by [`ModelRegistry::save`].
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        read_json(path)
    }

    /// Loads the active artifact, returning it with its resolved path.
    pub fn load_active<T: DeserializeOwned>(&self) -> Result<(T, PathBuf)> {
        let path = self.resolve_active()?;
        let model = self.load(&path)?;
        Ok((model, path))
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(RegistryError::Io {
            operation: "remove",
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Creates `link_path` as a symlink to `target`, relative to the link's
/// directory.
#[cfg(unix)]
fn link(target: &Path, link_path: &Path) -> std::io::Result<()> {
    let relative = target
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| std::io::Error::other("artifact path has no file name"))?;
    std::os::unix::fs::symlink(relative, link_path)
}

#[cfg(not(unix))]
fn link(_target: &Path, _link_path: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks are not used on this platform",
    ))
}

fn copy_synced(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to).map_err(RegistryError::io("copy", to))?;
    File::open(to)
        .and_then(|file| file.sync_all())
        .map_err(RegistryError::io("sync", to))
}
