//! Atomic file writes.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{RegistryError, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary sibling used while `path` is being replaced.
///
/// Unique per call within the process, so concurrent writers of the same
/// target never share a temporary file.
pub(crate) fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let sequence = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{sequence}.tmp", std::process::id()))
}

/// Writes `bytes` to `path` through a synced temporary file and a rename,
/// so readers see either the old content or the new content.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(RegistryError::io("create directory", parent))?;
    }

    let temp_path = temp_sibling(path);
    let mut file = File::create(&temp_path).map_err(RegistryError::io("create", &temp_path))?;
    file.write_all(bytes)
        .map_err(RegistryError::io("write", &temp_path))?;
    file.sync_all()
        .map_err(RegistryError::io("sync", &temp_path))?;
    drop(file);

    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(RegistryError::Io {
            operation: "rename",
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

/// Serializes `value` as pretty JSON and writes it atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut bytes =
        serde_json::to_vec_pretty(value).map_err(|source| RegistryError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

/// Reads and deserializes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(RegistryError::io("read", path))?;
    serde_json::from_slice(&bytes).map_err(|source| RegistryError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}
