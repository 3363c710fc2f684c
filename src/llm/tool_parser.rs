//! Tool parser for extracting tool calls from model text
//!
//! The model asks for tools by embedding fenced blocks tagged `json:tool` in
//! otherwise free-form prose:
//!
//! ````text
//! Sure, let me look.
//!
//! ```json:tool
//! {"tool": "read_note", "params": {"path": "Daily/today"}}
//! ```
//! ````
//!
//! Parsing never fails as a whole. Every malformed block is reported as a
//! `ParseError` and the remaining blocks are still parsed.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::ToolCall;

/// Fenced `json:tool` block: optional whitespace and a newline after the tag,
/// then the shortest run of text up to the next closing fence.
static TOOL_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json:tool\s*\n(.*?)```").expect("tool block pattern is valid"));

/// Kind of problem found in a tool block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    MalformedJson,
    InvalidStructure,
    MissingField,
}

/// A tool block that could not be turned into a `ToolCall`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    #[serde(rename = "type")]
    pub kind: ParseErrorKind,
    pub message: String,
    pub raw_block: String,
}

/// Location and trimmed inner text of one fenced tool block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolBlock {
    pub json_content: String,
    /// Byte offset of the opening fence
    pub start: usize,
    /// Byte offset just past the closing fence
    pub end: usize,
}

/// Result of parsing one model response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    /// Prose with every tool block removed, trimmed
    pub text_content: String,
    /// Successfully parsed calls in order of appearance
    pub tool_calls: Vec<ToolCall>,
    pub has_tool_calls: bool,
    pub errors: Vec<ParseError>,
}

/// Extracts `json:tool` blocks from model output
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    pub fn new() -> Self {
        Self
    }

    /// Split a response into prose, tool calls and per-block errors
    pub fn parse(&self, response: &str) -> ParsedResponse {
        let blocks = self.tool_blocks(response);
        let mut tool_calls = Vec::new();
        let mut errors = Vec::new();

        for block in &blocks {
            match parse_block(&block.json_content) {
                Ok(call) => tool_calls.push(call),
                Err((kind, message)) => errors.push(ParseError {
                    kind,
                    message,
                    raw_block: block.json_content.clone(),
                }),
            }
        }

        ParsedResponse {
            text_content: strip_blocks(response, &blocks).trim().to_string(),
            has_tool_calls: !tool_calls.is_empty(),
            tool_calls,
            errors,
        }
    }

    /// All non-overlapping tool blocks, left to right
    pub fn tool_blocks(&self, response: &str) -> Vec<ToolBlock> {
        TOOL_BLOCK
            .captures_iter(response)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let inner = caps.get(1)?;
                Some(ToolBlock {
                    json_content: inner.as_str().trim().to_string(),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect()
    }

    /// Structural check for a value claiming to be a tool call:
    /// an object with a non-empty string `tool` and an object `params`.
    pub fn is_valid_tool_call(value: &Value) -> bool {
        value
            .get("tool")
            .and_then(Value::as_str)
            .is_some_and(|tool| !tool.is_empty())
            && value.get("params").is_some_and(Value::is_object)
    }
}

fn parse_block(json_content: &str) -> Result<ToolCall, (ParseErrorKind, String)> {
    let parsed: Value = serde_json::from_str(json_content)
        .map_err(|e| (ParseErrorKind::MalformedJson, format!("Invalid JSON: {}", e)))?;

    let Value::Object(mut obj) = parsed else {
        return Err((ParseErrorKind::InvalidStructure, "Tool call must be an object".to_string()));
    };

    let tool = match obj.remove("tool") {
        Some(Value::String(tool)) => tool,
        _ => return Err((ParseErrorKind::MissingField, "Missing required field: tool".to_string())),
    };

    match obj.remove("params") {
        Some(Value::Object(params)) => Ok(ToolCall { tool, params }),
        _ => Err((ParseErrorKind::MissingField, "Missing required field: params".to_string())),
    }
}

/// Concatenate the spans around the given blocks
fn strip_blocks(response: &str, blocks: &[ToolBlock]) -> String {
    if blocks.is_empty() {
        return response.to_string();
    }

    let mut text = String::with_capacity(response.len());
    let mut last_end = 0;
    for block in blocks {
        text.push_str(&response[last_end..block.start]);
        last_end = block.end;
    }
    text.push_str(&response[last_end..]);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fence(body: &str) -> String {
        format!("```json:tool\n{}\n```", body)
    }

    #[test]
    fn test_plain_text() {
        let parsed = ResponseParser::new().parse("  Just an answer.\n");
        assert_eq!(parsed.text_content, "Just an answer.");
        assert!(!parsed.has_tool_calls);
        assert!(parsed.tool_calls.is_empty());
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_single_call() {
        let response = format!(
            "Let me read that.\n\n{}",
            fence(r#"{"tool": "read_note", "params": {"path": "Daily/today"}}"#)
        );
        let parsed = ResponseParser::new().parse(&response);

        assert!(parsed.has_tool_calls);
        assert_eq!(parsed.text_content, "Let me read that.");
        assert_eq!(
            parsed.tool_calls,
            vec![ToolCall::new("read_note", json!({"path": "Daily/today"}))]
        );
    }

    #[test]
    fn test_calls_keep_source_order() {
        let response = format!(
            "{}\nthen\n{}\nand\n{}",
            fence(r#"{"tool": "list_folder", "params": {"path": ""}}"#),
            fence(r#"{"tool": "read_note", "params": {"path": "a"}}"#),
            fence(r#"{"tool": "create_note", "params": {"path": "b", "content": "c"}}"#),
        );
        let parsed = ResponseParser::new().parse(&response);

        let names: Vec<_> = parsed.tool_calls.iter().map(|c| c.tool.as_str()).collect();
        assert_eq!(names, vec!["list_folder", "read_note", "create_note"]);
        assert_eq!(parsed.text_content, "then\n\nand");
    }

    #[test]
    fn test_ordinary_code_fences_are_prose() {
        let response = "```json\n{\"tool\": \"read_note\", \"params\": {}}\n```";
        let parsed = ResponseParser::new().parse(response);
        assert!(!parsed.has_tool_calls);
        assert_eq!(parsed.text_content, response);
    }

    #[test]
    fn test_malformed_json() {
        let parsed = ResponseParser::new().parse(&fence("{not json at all"));

        assert!(!parsed.has_tool_calls);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].kind, ParseErrorKind::MalformedJson);
        assert!(parsed.errors[0].message.starts_with("Invalid JSON: "));
        assert_eq!(parsed.errors[0].raw_block, "{not json at all");
    }

    #[test]
    fn test_non_object_payloads() {
        for body in ["null", "[1, 2]", "\"read_note\"", "42"] {
            let parsed = ResponseParser::new().parse(&fence(body));
            assert_eq!(parsed.errors[0].kind, ParseErrorKind::InvalidStructure, "body: {}", body);
            assert_eq!(parsed.errors[0].message, "Tool call must be an object");
        }
    }

    #[test]
    fn test_missing_tool_field() {
        let parsed = ResponseParser::new().parse(&fence(r#"{"params": {}}"#));
        assert_eq!(parsed.errors[0].kind, ParseErrorKind::MissingField);
        assert_eq!(parsed.errors[0].message, "Missing required field: tool");

        let parsed = ResponseParser::new().parse(&fence(r#"{"tool": 7, "params": {}}"#));
        assert_eq!(parsed.errors[0].message, "Missing required field: tool");
    }

    #[test]
    fn test_missing_params_field() {
        for body in [
            r#"{"tool": "read_note"}"#,
            r#"{"tool": "read_note", "params": null}"#,
            r#"{"tool": "read_note", "params": "path"}"#,
        ] {
            let parsed = ResponseParser::new().parse(&fence(body));
            assert_eq!(parsed.errors[0].kind, ParseErrorKind::MissingField);
            assert_eq!(parsed.errors[0].message, "Missing required field: params");
        }
    }

    #[test]
    fn test_bad_block_does_not_stop_parsing() {
        let response = format!(
            "{}\n{}",
            fence("{oops"),
            fence(r#"{"tool": "read_note", "params": {"path": "a"}}"#)
        );
        let parsed = ResponseParser::new().parse(&response);

        assert!(parsed.has_tool_calls);
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn test_unknown_tool_is_still_parsed() {
        let parsed = ResponseParser::new().parse(&fence(r#"{"tool": "launch_rocket", "params": {}}"#));
        assert_eq!(parsed.tool_calls[0].tool, "launch_rocket");
    }

    #[test]
    fn test_block_offsets() {
        let response = format!("ab{}cd", fence(r#"{"tool": "x", "params": {}}"#));
        let blocks = ResponseParser::new().tool_blocks(&response);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].start, 2);
        assert_eq!(blocks[0].end, response.len() - 2);
        assert_eq!(blocks[0].json_content, r#"{"tool": "x", "params": {}}"#);
    }

    #[test]
    fn test_fence_tag_whitespace_before_newline() {
        let response = "```json:tool   \n{\"tool\": \"x\", \"params\": {}}```";
        let parsed = ResponseParser::new().parse(response);
        assert!(parsed.has_tool_calls);
        assert_eq!(parsed.text_content, "");
    }

    #[test]
    fn test_is_valid_tool_call() {
        assert!(ResponseParser::is_valid_tool_call(&json!({"tool": "a", "params": {}})));
        assert!(!ResponseParser::is_valid_tool_call(&json!({"tool": "", "params": {}})));
        assert!(!ResponseParser::is_valid_tool_call(&json!({"tool": "a", "params": []})));
        assert!(!ResponseParser::is_valid_tool_call(&json!({"tool": "a"})));
        assert!(!ResponseParser::is_valid_tool_call(&json!(null)));
        assert!(!ResponseParser::is_valid_tool_call(&json!(["tool"])));
    }

    #[test]
    fn test_error_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&ParseErrorKind::MalformedJson).unwrap(),
            "\"malformed_json\""
        );
        assert_eq!(
            serde_json::to_string(&ParseErrorKind::InvalidStructure).unwrap(),
            "\"invalid_structure\""
        );
        assert_eq!(
            serde_json::to_string(&ParseErrorKind::MissingField).unwrap(),
            "\"missing_field\""
        );
    }
}
