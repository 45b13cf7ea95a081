//! Upload write-through to a local directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use docqa_core::UploadSink;

use crate::config::UploadsConfig;

/// Writes uploaded bytes under a root directory, optionally one
/// subdirectory per collection.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
    per_collection: bool,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>, per_collection: bool) -> Self {
        Self {
            root: root.into(),
            per_collection,
        }
    }

    pub fn from_config(config: &UploadsConfig) -> Self {
        Self::new(&config.dir, config.per_collection)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Upload directory for `collection`. The name must be a single plain
    /// path component so every collection stays inside its own directory
    /// under the root.
    fn dir_for(&self, collection: &str) -> Result<PathBuf> {
        if !self.per_collection {
            return Ok(self.root.clone());
        }
        let name = collection.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            bail!("invalid collection name for upload directory: {:?}", collection);
        }
        Ok(self.root.join(name))
    }
}

/// Final path component of `name`, accepting both separators.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

impl UploadSink for UploadDir {
    fn persist(&self, collection: &str, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = base_name(file_name);
        if name.is_empty() || name == "." || name == ".." {
            bail!("invalid upload file name: {:?}", file_name);
        }
        let dir = self.dir_for(collection)?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create upload directory: {}", dir.display()))?;
        let path = dir.join(name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write upload: {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "persisted upload");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_under_collection_dir() {
        let tmp = TempDir::new().unwrap();
        let uploads = UploadDir::new(tmp.path(), true);
        let path = uploads.persist("research", "paper.pdf", b"%PDF").unwrap();
        assert_eq!(path, tmp.path().join("research").join("paper.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF");
    }

    #[test]
    fn flat_layout_ignores_collection() {
        let tmp = TempDir::new().unwrap();
        let uploads = UploadDir::new(tmp.path(), false);
        let path = uploads.persist("research", "a.txt", b"x").unwrap();
        assert_eq!(path, tmp.path().join("a.txt"));
    }

    #[test]
    fn strips_directories_from_names() {
        let tmp = TempDir::new().unwrap();
        let uploads = UploadDir::new(tmp.path(), true);
        let path = uploads.persist("c", "../../etc/passwd", b"x").unwrap();
        assert_eq!(path, tmp.path().join("c").join("passwd"));
        let path = uploads.persist("c", r"C:\docs\notes.md", b"x").unwrap();
        assert_eq!(path, tmp.path().join("c").join("notes.md"));
    }

    #[test]
    fn rejects_empty_names() {
        let tmp = TempDir::new().unwrap();
        let uploads = UploadDir::new(tmp.path(), true);
        assert!(uploads.persist("c", "dir/", b"x").is_err());
        assert!(uploads.persist("c", "..", b"x").is_err());
    }

    #[test]
    fn rejects_collection_names_outside_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("uploads");
        let uploads = UploadDir::new(&root, true);
        for collection in ["..", ".", "", "x/", "a/x", r"b\x"] {
            let err = uploads.persist(collection, "a.txt", b"x").unwrap_err();
            assert!(err.to_string().contains("invalid collection name"), "{}", err);
        }
        assert!(!tmp.path().join("a.txt").exists());
        assert!(!root.join("a.txt").exists());
        assert!(!root.join("a").exists());
    }

    #[test]
    fn flat_layout_accepts_any_collection_name() {
        let tmp = TempDir::new().unwrap();
        let uploads = UploadDir::new(tmp.path(), false);
        let path = uploads.persist("a/x", "a.txt", b"x").unwrap();
        assert_eq!(path, tmp.path().join("a.txt"));
    }
}
