//! Content hashes used to derive run identifiers.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use housing_model::{ModelError, RunId};

use crate::error::{RegistryError, Result};

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 of a file, read in fixed-size chunks.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(RegistryError::io("open", path))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(RegistryError::io("read", path))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 of the compact JSON serialization of `value`, with object keys
/// in sorted order.
pub fn sha256_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(sha256_hex(&bytes))
}

/// Leading `len` characters of a hex digest.
pub fn short_hash(hash: &str, len: usize) -> &str {
    hash.get(..len).unwrap_or(hash)
}

/// Run id for a config/data pair: `{config[..12]}-{data[..12]}`.
pub fn derive_run_id(config_hash: &str, data_hash: &str) -> std::result::Result<RunId, ModelError> {
    RunId::new(format!(
        "{}-{}",
        short_hash(config_hash, 12),
        short_hash(data_hash, 12)
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn file_hash_matches_bytes_hash() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Hello, World!").unwrap();
        file.flush().unwrap();

        let hash = sha256_file(file.path()).unwrap();
        assert_eq!(
            hash,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
        assert_eq!(hash, sha256_hex(b"Hello, World!"));
    }

    #[test]
    fn run_id_joins_short_hashes() {
        let config = sha256_hex(b"config");
        let data = sha256_hex(b"data");
        let run_id = derive_run_id(&config, &data).unwrap();

        assert_eq!(run_id.as_str().len(), 25);
        assert_eq!(&run_id.as_str()[..12], &config[..12]);
        assert_eq!(&run_id.as_str()[13..], &data[..12]);
    }

    #[test]
    fn short_hash_tolerates_short_input() {
        assert_eq!(short_hash("abc", 12), "abc");
        assert_eq!(short_hash("abcdef", 2), "ab");
    }

    #[test]
    fn json_hash_is_stable() {
        let value = serde_json::json!({"alphas": [1.0, 10.0], "cv_folds": 3});
        assert_eq!(sha256_json(&value).unwrap(), sha256_json(&value).unwrap());
        assert_ne!(
            sha256_json(&value).unwrap(),
            sha256_json(&serde_json::json!({"alphas": [1.0], "cv_folds": 3})).unwrap()
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = sha256_file(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, RegistryError::Io { operation: "open", .. }));
    }
}
