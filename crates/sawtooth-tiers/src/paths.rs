//! Path utilities for the sharded filesystem layout.
//!
//! Keys are hashed so any string maps to a safe, fixed-length file name:
//!
//! ```text
//! <dir>/<aa>/<bb>/<sha256(key)>.json     (shard_depth = 2)
//! ```

use anyhow::{anyhow, Result};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Lowercase hex SHA-256 of a key (64 characters).
pub fn key_digest(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// Shard directory components for a digest: `depth` two-character prefixes.
pub fn shard_components(digest: &str, depth: usize) -> Vec<&str> {
    (0..depth)
        .map_while(|level| digest.get(level * 2..level * 2 + 2))
        .collect()
}

/// Full filesystem path for a key's value file.
pub fn value_path(dir: &Path, key: &str, shard_depth: usize) -> PathBuf {
    let digest = key_digest(key);
    let mut path = dir.to_path_buf();
    for shard in shard_components(&digest, shard_depth) {
        path.push(shard);
    }
    path.join(format!("{}.json", digest))
}

/// Ensure all parent directories exist for a path.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}

/// Write a file atomically.
///
/// Every call stages its bytes in its own uniquely named temp file next to
/// `path` and renames it into place, so concurrent writers of one key never
/// share a staging file. Readers see either the old or the new contents.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent_dirs(path)?;
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("Path has no parent directory: {}", path.display()))?;

    let mut staged = NamedTempFile::new_in(parent)
        .map_err(|e| anyhow!("Failed to create temp file in {}: {}", parent.display(), e))?;
    staged.write_all(contents).map_err(|e| {
        anyhow!("Failed to write temp file {}: {}", staged.path().display(), e)
    })?;
    staged
        .persist(path)
        .map_err(|e| anyhow!("Failed to move temp file to {}: {}", path.display(), e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_digest_is_stable() {
        let digest = key_digest("user:42");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, key_digest("user:42"));
        assert_ne!(digest, key_digest("user:43"));
    }

    #[test]
    fn test_value_path_layout() {
        let dir = Path::new("/cache/default");
        let digest = key_digest("k");

        let path = value_path(dir, "k", 2);
        let expected = dir
            .join(&digest[0..2])
            .join(&digest[2..4])
            .join(format!("{}.json", digest));
        assert_eq!(path, expected);

        let flat = value_path(dir, "k", 0);
        assert_eq!(flat, dir.join(format!("{}.json", digest)));
    }

    #[test]
    fn test_atomic_write_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("value.json");

        atomic_write(&path, b"{}").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("value.json")]);
    }

    #[test]
    fn test_atomic_write_replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("value.json");

        atomic_write(&path, b"old contents").unwrap();
        atomic_write(&path, b"new").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }
}
