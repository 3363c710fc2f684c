//! list_folder tool - list the direct children of a folder

use crate::vault::{DocumentStore, Entry, EntryKind, StoreError};

use super::ToolResult;
use super::path::normalize_folder_path;

const EMPTY_FOLDER: &str = "(empty folder)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFolderParams {
    pub path: String,
}

pub(super) async fn run(store: &dyn DocumentStore, params: &ListFolderParams) -> ToolResult {
    let path = normalize_folder_path(&params.path);

    match store.list(&path).await {
        Ok(entries) => ToolResult::success(format_listing(&entries)),
        Err(StoreError::NotFound { .. }) => ToolResult::failure(format!("Folder not found: {}", path)),
        Err(StoreError::NotAFolder { .. }) => ToolResult::failure(format!("Path is not a folder: {}", path)),
        Err(e) => ToolResult::failure(format!("Failed to list folder: {}", e)),
    }
}

/// One type-tagged line per entry, or a marker for an empty folder
pub fn format_listing(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return EMPTY_FOLDER.to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let icon = match entry.kind {
                EntryKind::Folder => "📁",
                EntryKind::File => "📄",
            };
            format!("{} {}", icon, entry.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
