//! Prompt construction for agent mode

use crate::tools::ToolDefinition;

/// Fence tag that marks a tool-call block in model output
pub const TOOL_FENCE_TAG: &str = "json:tool";

/// Build the agent-mode system prompt listing every available tool
pub fn agent_system_prompt(definitions: &[ToolDefinition]) -> String {
    let schemas = definitions
        .iter()
        .map(|def| {
            let schema = serde_json::to_string_pretty(&def.to_json_schema()).unwrap_or_default();
            format!(
                "### {}\n{}\n\nParameters:\n```json\n{}\n```",
                def.name, def.description, schema
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r##"You are an assistant embedded in a note vault. In agent mode you can read, create and organise any note in the user's vault.

## Available tools

{schemas}

## Tool usage rules

1. When you need a file operation, emit a ```{tag} code block containing the call
2. The call must follow this JSON structure exactly:

```{tag}
{{
  "tool": "tool_name",
  "params": {{
    "param_name": "value"
  }}
}}
```

3. You may call several tools in one reply; put each call in its own ```{tag} block
4. Tool results are sent back to you automatically and you can continue from them
5. If no file operation is needed, answer the user in plain text

## Example

User: "Create 2025-Plan.md in the Diary folder"

Your reply:
Sure, creating it now.

```{tag}
{{
  "tool": "create_note",
  "params": {{
    "path": "Diary/2025-Plan.md",
    "content": "# 2025 Plan\n\n## Goals\n\n- [ ] Goal 1\n- [ ] Goal 2"
  }}
}}
```

## Notes

- Paths are relative to the vault root
- The note extension is added automatically when missing
- Missing parent folders are created automatically
- Answer in concise, well-structured Markdown"##,
        schemas = schemas,
        tag = TOOL_FENCE_TAG,
    )
}

/// Prefix the question with the active note's content, if there is any
pub fn build_user_message(question: &str, context: Option<&str>) -> String {
    match context {
        Some(ctx) if !ctx.trim().is_empty() => {
            format!("Context from active note:\n\n{}\n\nUser Question: {}", ctx, question)
        }
        _ => question.to_string(),
    }
}

/// Message for acting on a selected span of text
pub fn build_selection_message(instruction: &str, selected: &str) -> String {
    format!("Selected Text:\n\n{}\n\nUser Instruction: {}", selected, instruction)
}
