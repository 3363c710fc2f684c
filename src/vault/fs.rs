//! Filesystem-backed document store rooted at a vault directory

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{DocumentStore, Entry, EntryKind, StoreError};

/// Stores documents as plain files below `root`
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path onto the filesystem, refusing anything that could leave the root
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StoreError::PathEscapesRoot { path: path.to_string() });
                }
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn kind(&self, path: &str) -> Result<Option<EntryKind>, StoreError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::metadata(&full_path).await {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Folder)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io("stat", e)),
        }
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        let full_path = self.resolve(path)?;
        match self.kind(path).await? {
            None => Err(StoreError::NotFound { path: path.to_string() }),
            Some(EntryKind::Folder) => Err(StoreError::NotAFile { path: path.to_string() }),
            Some(EntryKind::File) => tokio::fs::read_to_string(&full_path)
                .await
                .map_err(|e| StoreError::io("read", e)),
        }
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let full_path = self.resolve(path)?;
        tokio::fs::write(&full_path, content)
            .await
            .map_err(|e| StoreError::io("write", e))
    }

    async fn create_folder(&self, path: &str) -> Result<(), StoreError> {
        let full_path = self.resolve(path)?;
        tokio::fs::create_dir_all(&full_path)
            .await
            .map_err(|e| StoreError::io("create folder", e))
    }

    async fn list(&self, path: &str) -> Result<Vec<Entry>, StoreError> {
        let full_path = self.resolve(path)?;
        match self.kind(path).await? {
            None => return Err(StoreError::NotFound { path: path.to_string() }),
            Some(EntryKind::File) => return Err(StoreError::NotAFolder { path: path.to_string() }),
            Some(EntryKind::Folder) => {}
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&full_path)
            .await
            .map_err(|e| StoreError::io("list", e))?;

        while let Some(entry) = dir.next_entry().await.map_err(|e| StoreError::io("list", e))? {
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = entry.file_type().await.map_err(|e| StoreError::io("list", e))?;
            let kind = if file_type.is_dir() {
                EntryKind::Folder
            } else {
                EntryKind::File
            };
            entries.push(Entry { name, kind });
        }

        // read_dir order is platform dependent
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_read_write_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.write("note.md", "# Title\n\nBody").await.unwrap();
        let content = store.read("note.md").await.unwrap();

        assert_eq!(content, "# Title\n\nBody");
        assert_eq!(store.kind("note.md").await.unwrap(), Some(EntryKind::File));
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let result = store.read("missing.md").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_read_folder_is_not_a_file() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Daily")).unwrap();
        let store = FsStore::new(dir.path());

        let result = store.read("Daily").await;
        assert!(matches!(result, Err(StoreError::NotAFile { .. })));
    }

    #[tokio::test]
    async fn test_create_folder_nested() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.create_folder("a/b/c").await.unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
        assert_eq!(store.kind("a/b").await.unwrap(), Some(EntryKind::Folder));
    }

    #[tokio::test]
    async fn test_write_without_parent_fails() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let result = store.write("missing/note.md", "x").await;
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    #[tokio::test]
    async fn test_list_sorted_with_kinds() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("zebra.md"), "").unwrap();
        std::fs::write(dir.path().join("apple.md"), "").unwrap();
        std::fs::create_dir(dir.path().join("Projects")).unwrap();
        let store = FsStore::new(dir.path());

        let entries = store.list("").await.unwrap();
        assert_eq!(
            entries,
            vec![Entry::folder("Projects"), Entry::file("apple.md"), Entry::file("zebra.md")]
        );
    }

    #[tokio::test]
    async fn test_list_file_is_not_a_folder() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("note.md"), "").unwrap();
        let store = FsStore::new(dir.path());

        let result = store.list("note.md").await;
        assert!(matches!(result, Err(StoreError::NotAFolder { .. })));
    }

    #[tokio::test]
    async fn test_parent_dir_rejected() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let result = store.read("../etc/passwd").await;
        assert!(matches!(result, Err(StoreError::PathEscapesRoot { .. })));
    }

    #[tokio::test]
    async fn test_absolute_path_rejected() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let result = store.kind("/etc/passwd").await;
        assert!(matches!(result, Err(StoreError::PathEscapesRoot { .. })));
    }

    #[tokio::test]
    async fn test_root_and_empty_segments() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert_eq!(store.root(), dir.path());

        store.create_folder("a/").await.unwrap();
        store.write("a//b.md", "x").await.unwrap();
        assert_eq!(store.read("a/b.md").await.unwrap(), "x");
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("note.md"), "").unwrap();
        let store = FsStore::new(dir.path());

        assert!(store.exists("note.md").await.unwrap());
        assert!(!store.exists("other.md").await.unwrap());
        assert!(store.exists("").await.unwrap());
    }
}
