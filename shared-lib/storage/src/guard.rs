//! Student storage namespace guard.
//!
//! # Security
//!
//! Paths are normalized lexically (`.` dropped, `..` pops a component) and
//! must stay inside the student's root, compared component-wise. Rejection
//! happens before any filesystem call.
//!
//! ## Known Limitations
//!
//! Symlinks inside a student root are not resolved. A link planted there by
//! something other than this crate would be followed by reads and writes.
//! This crate never creates links.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use error::StorageError;
use walkdir::WalkDir;

use crate::config::StorageConfig;

/// Keep only alphanumerics, `-` and `_`.
pub fn sanitize_identity(identity: &str) -> String {
    identity
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Per-student file storage rooted at `base_dir / sanitized_identity`.
#[derive(Debug, Clone)]
pub struct StudentStorage {
    base: PathBuf,
    max_file_bytes: usize,
}

impl StudentStorage {
    /// Open storage, creating the base directory if needed.
    ///
    /// The base is canonicalized once here; per-request resolution is purely
    /// lexical.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.base_dir)?;
        let base = config.base_dir.canonicalize()?;
        tracing::info!("Student storage at {}", base.display());

        Ok(Self {
            base,
            max_file_bytes: config.max_file_bytes,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Whether the base directory is present and usable.
    pub async fn is_ready(&self) -> bool {
        tokio::fs::metadata(&self.base)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Root directory for a student. Does not touch the filesystem.
    pub fn root_dir(&self, identity: &str) -> Result<PathBuf, StorageError> {
        let safe = sanitize_identity(identity);
        if safe.is_empty() {
            return Err(StorageError::InvalidIdentity);
        }
        Ok(self.base.join(safe))
    }

    /// Map a student-relative path to an absolute path inside their root.
    pub fn resolve(&self, identity: &str, relative: &str) -> Result<PathBuf, StorageError> {
        let root = self.root_dir(identity)?;
        if relative.trim().is_empty() || relative.contains('\0') {
            return Err(StorageError::InvalidPath);
        }

        let candidate = normalize(&root.join(relative));
        if !candidate.starts_with(&root) {
            tracing::warn!(
                "Rejected path escape for student {}: {:?}",
                sanitize_identity(identity),
                relative
            );
            return Err(StorageError::PathEscape);
        }
        if candidate == root {
            return Err(StorageError::InvalidPath);
        }

        Ok(candidate)
    }

    /// Replace the file's contents, creating parent directories.
    pub async fn write(
        &self,
        identity: &str,
        relative: &str,
        content: &str,
    ) -> Result<(), StorageError> {
        let path = self.resolve(identity, relative)?;
        if content.len() > self.max_file_bytes {
            return Err(StorageError::TooLarge {
                limit: self.max_file_bytes,
            });
        }

        if let Ok(meta) = tokio::fs::metadata(&path).await {
            if meta.is_dir() {
                return Err(StorageError::InvalidPath);
            }
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| blocked_by_file(e, &path))?;
        }
        // Single buffered write; concurrent writers to one path: last wins.
        tokio::fs::write(&path, content.as_bytes())
            .await
            .map_err(|e| blocked_by_file(e, &path))?;

        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    pub async fn read(&self, identity: &str, relative: &str) -> Result<String, StorageError> {
        let path = self.resolve(identity, relative)?;
        ensure_file(&path).await?;
        tokio::fs::read_to_string(&path).await.map_err(io_failure)
    }

    /// All regular files under the student's root, relative and `/`-separated.
    pub async fn list(&self, identity: &str) -> Result<Vec<String>, StorageError> {
        let root = self.root_dir(identity)?;
        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Ok(Vec::new()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_failure(e)),
        }

        tokio::task::spawn_blocking(move || collect_files(&root))
            .await
            .map_err(|e| io_failure(std::io::Error::other(e)))?
    }

    pub async fn delete(&self, identity: &str, relative: &str) -> Result<(), StorageError> {
        let path = self.resolve(identity, relative)?;
        ensure_file(&path).await?;
        tokio::fs::remove_file(&path).await.map_err(|e| {
            if is_missing(&e) {
                StorageError::NotFound
            } else {
                io_failure(e)
            }
        })?;

        tracing::debug!("Deleted {}", path.display());
        Ok(())
    }
}

fn io_failure(e: std::io::Error) -> StorageError {
    tracing::error!("Storage I/O failure: {}", e);
    StorageError::Io(e)
}

/// The target does not exist, including when an ancestor is a regular file.
fn is_missing(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

/// A write whose parent chain runs through an existing file is a bad path,
/// not a server failure.
fn blocked_by_file(e: std::io::Error, path: &Path) -> StorageError {
    match e.kind() {
        ErrorKind::AlreadyExists | ErrorKind::NotADirectory => {
            tracing::debug!("Write blocked by a file ancestor: {}", path.display());
            StorageError::InvalidPath
        }
        _ => io_failure(e),
    }
}

async fn ensure_file(path: &Path) -> Result<(), StorageError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(StorageError::NotFound),
        Err(e) if is_missing(&e) => Err(StorageError::NotFound),
        Err(e) => Err(io_failure(e)),
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

fn collect_files(root: &Path) -> Result<Vec<String>, StorageError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| io_failure(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        files.push(parts.join("/"));
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (TempDir, StudentStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StudentStorage::open(&StorageConfig::new(dir.path())).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_sanitize_identity() {
        assert_eq!(sanitize_identity("abc-123"), "abc-123");
        assert_eq!(sanitize_identity("stu_7"), "stu_7");
        assert_eq!(sanitize_identity("../stu 7/"), "stu7");
        assert_eq!(sanitize_identity("BN-ÄB12"), "BN-ÄB12");
        assert_eq!(sanitize_identity("../../"), "");
    }

    #[test]
    fn test_resolve_stays_inside_root() {
        let (_dir, storage) = storage();
        let path = storage.resolve("stu_7", "notes/./a.json").unwrap();
        assert_eq!(path, storage.base_dir().join("stu_7").join("notes").join("a.json"));

        let path = storage.resolve("stu_7", "notes/drafts/../a.json").unwrap();
        assert_eq!(path, storage.base_dir().join("stu_7").join("notes").join("a.json"));
    }

    #[test]
    fn test_resolve_rejects_escapes() {
        let (_dir, storage) = storage();
        for relative in ["../../etc/passwd", "..", "notes/../../x", "/etc/passwd", "../abc-1234/x"] {
            assert!(
                matches!(storage.resolve("abc-123", relative), Err(StorageError::PathEscape)),
                "accepted {:?}",
                relative
            );
        }
    }

    #[test]
    fn test_resolve_rejects_root_and_empty() {
        let (_dir, storage) = storage();
        for relative in ["", "  ", ".", "notes/..", "a\0b"] {
            assert!(
                matches!(storage.resolve("stu_7", relative), Err(StorageError::InvalidPath)),
                "accepted {:?}",
                relative
            );
        }
        assert!(matches!(
            storage.resolve("../..", "a.json"),
            Err(StorageError::InvalidIdentity)
        ));
    }

    #[tokio::test]
    async fn test_escape_performs_no_io() {
        let (dir, storage) = storage();
        let result = storage.write("abc-123", "../../etc/passwd", "x").await;
        assert!(matches!(result, Err(StorageError::PathEscape)));
        assert!(!dir.path().join("abc-123").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_dir, storage) = storage();
        storage.write("stu_7", "notes/a.json", "{}").await.unwrap();
        assert_eq!(storage.read("stu_7", "notes/a.json").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let (_dir, storage) = storage();
        storage.write("stu_7", "history.json", "[1,2,3]").await.unwrap();
        storage.write("stu_7", "history.json", "[]").await.unwrap();
        assert_eq!(storage.read("stu_7", "history.json").await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_read_missing() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.read("stu_7", "nope.json").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_never_written() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.delete("stu_7", "notes/a.json").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let (_dir, storage) = storage();
        storage.write("stu_7", "notes/a.json", "{}").await.unwrap();
        storage.delete("stu_7", "notes/a.json").await.unwrap();
        assert!(matches!(
            storage.read("stu_7", "notes/a.json").await,
            Err(StorageError::NotFound)
        ));
        // directories are left in place
        assert!(storage.base_dir().join("stu_7").join("notes").is_dir());
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let (_dir, storage) = storage();
        storage.write("stu_7", "notes/a.json", "{}").await.unwrap();
        assert!(matches!(storage.read("stu_7", "notes").await, Err(StorageError::NotFound)));
        assert!(matches!(storage.delete("stu_7", "notes").await, Err(StorageError::NotFound)));
        assert!(matches!(
            storage.write("stu_7", "notes", "{}").await,
            Err(StorageError::InvalidPath)
        ));
    }

    #[tokio::test]
    async fn test_file_used_as_directory() {
        let (_dir, storage) = storage();
        storage.write("stu_7", "a.json", "{}").await.unwrap();

        assert!(matches!(
            storage.read("stu_7", "a.json/x").await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            storage.delete("stu_7", "a.json/x").await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            storage.write("stu_7", "a.json/x", "{}").await,
            Err(StorageError::InvalidPath)
        ));
        assert!(matches!(
            storage.write("stu_7", "a.json/deeper/x", "{}").await,
            Err(StorageError::InvalidPath)
        ));
        assert_eq!(storage.read("stu_7", "a.json").await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_is_ready() {
        let (dir, storage) = storage();
        assert!(storage.is_ready().await);

        std::fs::remove_dir(dir.path()).unwrap();
        assert!(!storage.is_ready().await);
    }

    #[tokio::test]
    async fn test_identities_are_isolated() {
        let (_dir, storage) = storage();
        storage.write("stu_1", "notes/a.json", "{\"owner\":1}").await.unwrap();
        storage.write("stu_2", "notes/a.json", "{\"owner\":2}").await.unwrap();

        assert_eq!(storage.read("stu_1", "notes/a.json").await.unwrap(), "{\"owner\":1}");
        assert_eq!(storage.read("stu_2", "notes/a.json").await.unwrap(), "{\"owner\":2}");

        storage.delete("stu_1", "notes/a.json").await.unwrap();
        assert_eq!(storage.read("stu_2", "notes/a.json").await.unwrap(), "{\"owner\":2}");
    }

    #[tokio::test]
    async fn test_list_returns_relative_paths() {
        let (_dir, storage) = storage();
        storage.write("stu_7", "notes/a.json", "{}").await.unwrap();
        storage.write("stu_7", "quiz/attempts/1.json", "{}").await.unwrap();
        storage.write("stu_7", "photos/avatar.txt", "data").await.unwrap();
        storage.write("stu_8", "notes/b.json", "{}").await.unwrap();

        let mut files = storage.list("stu_7").await.unwrap();
        files.sort();
        assert_eq!(
            files,
            vec!["notes/a.json", "photos/avatar.txt", "quiz/attempts/1.json"]
        );
    }

    #[tokio::test]
    async fn test_list_unknown_student_is_empty() {
        let (_dir, storage) = storage();
        assert!(storage.list("stu_404").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::new(dir.path()).with_max_file_bytes(4);
        let storage = StudentStorage::open(&config).unwrap();

        storage.write("stu_7", "a.txt", "1234").await.unwrap();
        assert!(matches!(
            storage.write("stu_7", "b.txt", "12345").await,
            Err(StorageError::TooLarge { limit: 4 })
        ));
        assert_eq!(storage.list("stu_7").await.unwrap(), vec!["a.txt"]);
    }
}
