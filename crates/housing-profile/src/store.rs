//! Reading and writing the `training_profile.json` artifact.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use housing_model::TrainingProfile;
use housing_registry::write_json;

use crate::error::{ProfileError, Result};

/// Loads a stored profile.
///
/// A missing file is `Ok(None)`: drift reporting is simply disabled. A file
/// that exists but is empty or not a valid profile is an error.
pub fn load_profile(path: &Path) -> Result<Option<TrainingProfile>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no training profile, drift disabled");
            return Ok(None);
        }
        Err(source) => {
            return Err(ProfileError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let profile = serde_json::from_slice(&bytes).map_err(|source| ProfileError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(profile))
}

/// Writes `profile` atomically, creating parent directories.
pub fn write_profile(path: &Path, profile: &TrainingProfile) -> Result<()> {
    write_json(path, profile)?;
    info!(path = %path.display(), "wrote training profile");
    Ok(())
}
