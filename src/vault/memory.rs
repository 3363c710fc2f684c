//! In-memory document store, used by tests and for embedding without a vault on disk

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{DocumentStore, Entry, EntryKind, StoreError, parent_of};

#[derive(Debug, Clone)]
enum Node {
    File(String),
    Folder,
}

/// Documents kept in a sorted map keyed by path. The root folder is implicit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: Mutex<BTreeMap<String, Node>>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write with a permission error
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Seed a document, creating its parent folders
    pub fn with_file(self, path: &str, content: &str) -> Self {
        {
            let path = canonical(path);
            let mut nodes = self.lock();
            insert_ancestors(&mut nodes, parent_of(&path));
            nodes.insert(path, Node::File(content.to_string()));
        }
        self
    }

    /// Seed a folder, creating its ancestors
    pub fn with_folder(self, path: &str) -> Self {
        insert_ancestors(&mut self.lock(), &canonical(path));
        self
    }

    /// Current content of a document, if any
    pub fn content(&self, path: &str) -> Option<String> {
        match self.lock().get(&canonical(path)) {
            Some(Node::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Node>> {
        self.nodes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn denied(operation: &str) -> StoreError {
        StoreError::io(
            operation,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "store is read-only"),
        )
    }
}

/// Collapse empty and `.` segments so `a//b` and `a/./b` name `a/b`, as on disk
fn canonical(path: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn insert_ancestors(nodes: &mut BTreeMap<String, Node>, folder: &str) {
    if folder.is_empty() {
        return;
    }
    let mut current = String::new();
    for part in folder.split('/').filter(|p| !p.is_empty()) {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(part);
        nodes.entry(current.clone()).or_insert(Node::Folder);
    }
}

fn kind_of(nodes: &BTreeMap<String, Node>, path: &str) -> Option<EntryKind> {
    if path.is_empty() {
        return Some(EntryKind::Folder);
    }
    nodes.get(path).map(|node| match node {
        Node::File(_) => EntryKind::File,
        Node::Folder => EntryKind::Folder,
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn kind(&self, path: &str) -> Result<Option<EntryKind>, StoreError> {
        Ok(kind_of(&self.lock(), &canonical(path)))
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        let path = canonical(path);
        match self.lock().get(&path) {
            Some(Node::File(content)) => Ok(content.clone()),
            Some(Node::Folder) => Err(StoreError::NotAFile { path }),
            None if path.is_empty() => Err(StoreError::NotAFile { path }),
            None => Err(StoreError::NotFound { path }),
        }
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(Self::denied("write"));
        }
        let path = canonical(path);
        let mut nodes = self.lock();
        let parent = parent_of(&path);
        if kind_of(&nodes, parent) != Some(EntryKind::Folder) {
            return Err(StoreError::NotFound {
                path: parent.to_string(),
            });
        }
        if kind_of(&nodes, &path) == Some(EntryKind::Folder) {
            return Err(StoreError::NotAFile { path });
        }
        nodes.insert(path, Node::File(content.to_string()));
        Ok(())
    }

    async fn create_folder(&self, path: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(Self::denied("create folder"));
        }
        let path = canonical(path);
        let mut nodes = self.lock();
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            if let Some(Node::File(_)) = nodes.get(&current) {
                return Err(StoreError::NotAFolder { path: current });
            }
        }
        insert_ancestors(&mut nodes, &path);
        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<Entry>, StoreError> {
        let path = canonical(path);
        let nodes = self.lock();
        match kind_of(&nodes, &path) {
            None => return Err(StoreError::NotFound { path }),
            Some(EntryKind::File) => return Err(StoreError::NotAFolder { path }),
            Some(EntryKind::Folder) => {}
        }

        let entries = nodes
            .iter()
            .filter(|(key, _)| parent_of(key) == path && **key != path)
            .map(|(key, node)| {
                let name = key.rsplit('/').next().unwrap_or(key).to_string();
                match node {
                    Node::File(_) => Entry::file(name),
                    Node::Folder => Entry::folder(name),
                }
            })
            .collect();
        Ok(entries)
    }
}
