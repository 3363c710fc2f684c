//! Tool system - definitions, typed requests and the registry that runs them
//!
//! The model addresses tools by name with a loosely typed JSON parameter map
//! (`ToolCall`). `ToolRegistry::validate` turns that into a `ToolRequest`, one
//! variant per tool with its own parameter struct, and only validated requests
//! ever reach the document store.

mod create_note;
mod definition;
mod list_folder;
mod path;
mod read_note;
mod registry;
mod request;

pub use create_note::CreateNoteParams;
pub use definition::{
    CREATE_NOTE, LIST_FOLDER, ParamSpec, ParamType, READ_NOTE, ToolDefinition, WriteMode, standard_definitions,
};
pub use list_folder::{ListFolderParams, format_listing};
pub use path::{INVALID_PATH_CHARS, NOTE_EXTENSION, is_valid_path, normalize_folder_path, normalize_note_path};
pub use read_note::ReadNoteParams;
pub use registry::ToolRegistry;
pub use request::{ToolRequest, ValidationError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool invocation as written by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    pub params: Map<String, Value>,
}

impl ToolCall {
    /// Create a tool call. Non-object `params` become an empty map.
    pub fn new(tool: impl Into<String>, params: Value) -> Self {
        let params = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            tool: tool.into(),
            params,
        }
    }
}

/// Outcome of one tool execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// The meaningful half of the result: `data` on success, `error` otherwise
    pub fn message(&self) -> &str {
        let text = if self.success { &self.data } else { &self.error };
        text.as_deref().unwrap_or("")
    }
}

/// Immutable record of a tool call and what it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecution {
    pub tool_call: ToolCall,
    pub result: ToolResult,
    pub timestamp: DateTime<Utc>,
}

impl ToolExecution {
    pub fn new(tool_call: ToolCall, result: ToolResult) -> Self {
        Self {
            tool_call,
            result,
            timestamp: Utc::now(),
        }
    }
}
