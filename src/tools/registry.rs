//! Tool registry - declares the tool catalogue and executes validated calls

use std::sync::Arc;

use log::debug;

use crate::vault::DocumentStore;

use super::definition::{ToolDefinition, standard_definitions};
use super::path::NOTE_EXTENSION;
use super::request::{ToolRequest, ValidationError};
use super::{ToolCall, ToolResult, create_note, list_folder, read_note};

/// Owns the tool definitions and the document store they operate on
pub struct ToolRegistry {
    store: Arc<dyn DocumentStore>,
    definitions: Vec<ToolDefinition>,
    extension: String,
}

impl ToolRegistry {
    /// Create a registry with the standard note tools over `store`
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            definitions: standard_definitions(NOTE_EXTENSION),
            extension: NOTE_EXTENSION.to_string(),
        }
    }

    /// Use a different document extension (".md" by default)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self.definitions = standard_definitions(&self.extension);
        self
    }

    /// Tool definitions in stable prompt order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Names of all registered tools, in definition order
    pub fn tool_names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| d.name == name)
    }

    /// Validate a call, producing the typed request on success
    pub fn validate(&self, call: &ToolCall) -> Result<ToolRequest, ValidationError> {
        ToolRequest::from_call(call, &self.definitions)
    }

    /// Validate and execute a call. Never fails: every problem becomes a failed `ToolResult`.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.validate(call) {
            Ok(request) => self.dispatch(&request).await,
            Err(e) => {
                debug!("Rejected {} call: {}", call.tool, e);
                ToolResult::failure(e.to_string())
            }
        }
    }

    /// Execute an already-validated request
    pub async fn dispatch(&self, request: &ToolRequest) -> ToolResult {
        debug!("Executing tool {}", request.tool_name());
        let store = self.store.as_ref();
        match request {
            ToolRequest::ReadNote(params) => read_note::run(store, params, &self.extension).await,
            ToolRequest::CreateNote(params) => create_note::run(store, params, &self.extension).await,
            ToolRequest::ListFolder(params) => list_folder::run(store, params).await,
        }
    }
}
