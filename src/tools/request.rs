//! Typed tool requests and parameter validation
//!
//! Validation happens exactly once, at the point where a wire `ToolCall` is
//! converted into a `ToolRequest`. Checks run in a fixed precedence and the
//! first violation wins:
//! 1. unknown tool name
//! 2. missing (or null) required parameter, in declaration order
//! 3. present parameter of the wrong type, null included
//! 4. present parameter outside its enumerated values
//!
//! Parameters the schema does not declare are ignored.

use serde_json::{Map, Value};

use super::create_note::CreateNoteParams;
use super::definition::{CREATE_NOTE, LIST_FOLDER, ParamType, READ_NOTE, ToolDefinition, WriteMode};
use super::list_folder::ListFolderParams;
use super::read_note::ReadNoteParams;
use super::ToolCall;

/// A validated tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    ReadNote(ReadNoteParams),
    CreateNote(CreateNoteParams),
    ListFolder(ListFolderParams),
}

impl ToolRequest {
    /// Name of the tool this request targets
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolRequest::ReadNote(_) => READ_NOTE,
            ToolRequest::CreateNote(_) => CREATE_NOTE,
            ToolRequest::ListFolder(_) => LIST_FOLDER,
        }
    }

    /// Validate a wire call against the given definitions and convert it
    pub fn from_call(call: &ToolCall, definitions: &[ToolDefinition]) -> Result<Self, ValidationError> {
        let definition = definitions
            .iter()
            .find(|d| d.name == call.tool)
            .ok_or_else(|| ValidationError::UnknownTool {
                name: call.tool.clone(),
            })?;

        check_params(definition, &call.params)?;

        let params = &call.params;
        match definition.name.as_str() {
            READ_NOTE => Ok(ToolRequest::ReadNote(ReadNoteParams {
                path: string_param(params, "path"),
            })),
            CREATE_NOTE => Ok(ToolRequest::CreateNote(CreateNoteParams {
                path: string_param(params, "path"),
                content: string_param(params, "content"),
                mode: params
                    .get("mode")
                    .and_then(Value::as_str)
                    .and_then(WriteMode::parse)
                    .unwrap_or_default(),
            })),
            LIST_FOLDER => Ok(ToolRequest::ListFolder(ListFolderParams {
                path: string_param(params, "path"),
            })),
            // Declared but not implemented
            _ => Err(ValidationError::UnknownTool {
                name: call.tool.clone(),
            }),
        }
    }
}

/// Why a tool call was rejected before execution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("Parameter '{name}' must be a {expected}")]
    WrongType { name: String, expected: ParamType },

    #[error("Parameter '{name}' must be one of: {}", .allowed.join(", "))]
    NotInEnum { name: String, allowed: Vec<String> },
}

fn check_params(definition: &ToolDefinition, params: &Map<String, Value>) -> Result<(), ValidationError> {
    for name in definition.required() {
        if params.get(name).is_none_or(Value::is_null) {
            return Err(ValidationError::MissingParameter { name: name.to_string() });
        }
    }

    for spec in &definition.params {
        let Some(value) = params.get(&spec.name) else {
            continue;
        };

        if !spec.param_type.accepts(value) {
            return Err(ValidationError::WrongType {
                name: spec.name.clone(),
                expected: spec.param_type,
            });
        }

        if let Some(allowed) = &spec.enum_values
            && !value.as_str().is_some_and(|v| allowed.iter().any(|a| a == v))
        {
            return Err(ValidationError::NotInEnum {
                name: spec.name.clone(),
                allowed: allowed.clone(),
            });
        }
    }

    Ok(())
}

fn string_param(params: &Map<String, Value>, name: &str) -> String {
    params.get(name).and_then(Value::as_str).unwrap_or_default().to_string()
}
