//! Document store abstraction
//!
//! The tools never touch the filesystem directly; they go through a
//! `DocumentStore`, a hierarchical text-document repository addressed with
//! forward-slash paths relative to a single root. The empty string names the
//! root folder.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of entry stored at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// A direct child of a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Entry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Folder,
        }
    }
}

/// Storage backend the tool registry operates on
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// What lives at `path`, or `None` if nothing does
    async fn kind(&self, path: &str) -> Result<Option<EntryKind>, StoreError>;

    /// Read a document verbatim
    async fn read(&self, path: &str) -> Result<String, StoreError>;

    /// Create or replace a document. The parent folder must already exist.
    async fn write(&self, path: &str, content: &str) -> Result<(), StoreError>;

    /// Create a folder and any missing ancestors
    async fn create_folder(&self, path: &str) -> Result<(), StoreError>;

    /// Direct children of a folder, in the store's enumeration order
    async fn list(&self, path: &str) -> Result<Vec<Entry>, StoreError>;

    /// Check whether anything exists at `path`
    async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(self.kind(path).await?.is_some())
    }
}

/// Errors raised by a document store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Not a file: {path}")]
    NotAFile { path: String },

    #[error("Not a folder: {path}")]
    NotAFolder { path: String },

    #[error("Path {path} escapes the vault root")]
    PathEscapesRoot { path: String },

    #[error("IO error during {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Parent folder of a store path ("" for top-level entries)
pub(crate) fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}
