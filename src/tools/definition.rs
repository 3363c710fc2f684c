//! Tool definitions - names, descriptions and parameter schemas
//!
//! Definitions serve two purposes: they are rendered into the system prompt so
//! the model knows what it may call, and they drive parameter validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub const READ_NOTE: &str = "read_note";
pub const CREATE_NOTE: &str = "create_note";
pub const LIST_FOLDER: &str = "list_folder";

/// Declared type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
        }
    }

    /// Check whether a JSON value has this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared parameter of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    pub required: bool,
}

impl ParamSpec {
    /// A required string parameter
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            param_type: ParamType::String,
            enum_values: None,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

/// Name, description and parameter schema of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params,
        }
    }

    /// Look up a declared parameter
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Required parameter names in declaration order
    pub fn required(&self) -> impl Iterator<Item = &str> {
        self.params.iter().filter(|p| p.required).map(|p| p.name.as_str())
    }

    /// JSON Schema for the parameters, as shown to the model
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut prop = json!({
                "type": param.param_type.as_str(),
                "description": param.description,
            });
            if let Some(values) = &param.enum_values {
                prop["enum"] = json!(values);
            }
            properties.insert(param.name.clone(), prop);
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required().collect::<Vec<_>>(),
        })
    }
}

/// How `create_note` treats an existing document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

impl WriteMode {
    pub const ALL: [&'static str; 2] = ["overwrite", "append"];

    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Overwrite => "overwrite",
            WriteMode::Append => "append",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "overwrite" => Some(WriteMode::Overwrite),
            "append" => Some(WriteMode::Append),
            _ => None,
        }
    }
}

/// The fixed tool catalogue, in prompt order
pub fn standard_definitions(extension: &str) -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            READ_NOTE,
            "Read the content of a note. The path is relative to the vault root.",
            vec![ParamSpec::string(
                "path",
                format!(
                    "Note path, e.g. \"Daily/2025-01-15{ext}\" or \"Ideas/project\" (the {ext} extension is added automatically)",
                    ext = extension
                ),
            )],
        ),
        ToolDefinition::new(
            CREATE_NOTE,
            "Create or update a note at the given path. Missing parent folders are created.",
            vec![
                ParamSpec::string("path", format!("Note path, e.g. \"Diary/2025-Plan{}\"", extension)),
                ParamSpec::string("content", "Note content (Markdown)"),
                ParamSpec::string("mode", "Write mode: overwrite (default) or append")
                    .optional()
                    .one_of(&WriteMode::ALL),
            ],
        ),
        ToolDefinition::new(
            LIST_FOLDER,
            "List the files and sub-folders of a folder.",
            vec![ParamSpec::string(
                "path",
                "Folder path; an empty string or \"/\" means the vault root",
            )],
        ),
    ]
}
