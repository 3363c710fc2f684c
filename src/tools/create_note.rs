//! create_note tool - create, overwrite or append to a note

use log::debug;

use crate::vault::{DocumentStore, EntryKind, StoreError, parent_of};

use super::ToolResult;
use super::definition::WriteMode;
use super::path::{is_valid_path, normalize_note_path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNoteParams {
    pub path: String,
    pub content: String,
    pub mode: WriteMode,
}

pub(super) async fn run(store: &dyn DocumentStore, params: &CreateNoteParams, extension: &str) -> ToolResult {
    let path = normalize_note_path(&params.path, extension);
    if path.is_empty() {
        return ToolResult::failure("Path cannot be empty");
    }

    if !is_valid_path(&path) {
        return ToolResult::failure("Invalid path: contains illegal characters (<>:\"|?*)");
    }

    match write_note(store, &path, &params.content, params.mode).await {
        Ok(message) => ToolResult::success(message),
        Err(e) => ToolResult::failure(format!("Failed to write file: {}", e)),
    }
}

async fn write_note(
    store: &dyn DocumentStore,
    path: &str,
    content: &str,
    mode: WriteMode,
) -> Result<String, StoreError> {
    let folder = parent_of(path);
    if !folder.is_empty() && store.kind(folder).await? != Some(EntryKind::Folder) {
        debug!("Creating parent folder {}", folder);
        store.create_folder(folder).await?;
    }

    debug!("Writing {} ({} mode)", path, mode.as_str());
    match (store.kind(path).await?, mode) {
        (Some(EntryKind::File), WriteMode::Append) => {
            let current = store.read(path).await?;
            store.write(path, &format!("{}\n{}", current, content)).await?;
            Ok(format!("Content appended to: {}", path))
        }
        (Some(EntryKind::File), WriteMode::Overwrite) => {
            store.write(path, content).await?;
            Ok(format!("File overwritten: {}", path))
        }
        _ => {
            store.write(path, content).await?;
            Ok(format!("File created: {}", path))
        }
    }
}
