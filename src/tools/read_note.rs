//! read_note tool - return a note's content verbatim

use crate::vault::{DocumentStore, EntryKind};

use super::ToolResult;
use super::path::normalize_note_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadNoteParams {
    pub path: String,
}

pub(super) async fn run(store: &dyn DocumentStore, params: &ReadNoteParams, extension: &str) -> ToolResult {
    let path = normalize_note_path(&params.path, extension);
    if path.is_empty() {
        return ToolResult::failure("Path cannot be empty");
    }

    match store.kind(&path).await {
        Ok(None) => ToolResult::failure(format!("File not found: {}", path)),
        Ok(Some(EntryKind::Folder)) => ToolResult::failure(format!("Path is not a file: {}", path)),
        Ok(Some(EntryKind::File)) => match store.read(&path).await {
            Ok(content) => ToolResult::success(content),
            Err(e) => ToolResult::failure(format!("Failed to read file: {}", e)),
        },
        Err(e) => ToolResult::failure(format!("Failed to read file: {}", e)),
    }
}
