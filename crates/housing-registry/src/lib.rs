//! Filesystem model registry with an atomically swapped active pointer.

pub mod error;
pub mod hash;
pub mod io;
pub mod registry;

pub use error::{RegistryError, Result};
pub use hash::{derive_run_id, sha256_file, sha256_hex, sha256_json, short_hash};
pub use io::{read_json, write_atomic, write_json};
pub use registry::ModelRegistry;
