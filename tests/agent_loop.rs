//! Agent loop integration tests
//!
//! Drives the parser, registry and execution loop together with a scripted
//! model against in-memory and on-disk vaults.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::mpsc;

use vaultloop::llm::{Message, MockChatModel, ParseErrorKind, ResponseParser, Role, agent_system_prompt};
use vaultloop::runner::{ExecutionContext, ExecutionLoop};
use vaultloop::tools::{ToolCall, ToolRegistry, normalize_folder_path, normalize_note_path};
use vaultloop::vault::{DocumentStore, Entry, EntryKind, FsStore, MemoryStore, StoreError};

fn tool_block(tool: &str, params: Value) -> String {
    format!("```json:tool\n{}\n```", json!({"tool": tool, "params": params}))
}

fn build_loop(store: Arc<dyn DocumentStore>, model: MockChatModel) -> (ExecutionLoop<MockChatModel>, Arc<MockChatModel>) {
    let model = Arc::new(model);
    let registry = Arc::new(ToolRegistry::new(store));
    (ExecutionLoop::new(registry, ResponseParser::new(), model.clone()), model)
}

/// Store that sleeps before every read, longest for paths that sort first
struct SlowStore {
    inner: MemoryStore,
}

#[async_trait]
impl DocumentStore for SlowStore {
    async fn kind(&self, path: &str) -> Result<Option<EntryKind>, StoreError> {
        self.inner.kind(path).await
    }

    async fn read(&self, path: &str) -> Result<String, StoreError> {
        let delay = match path {
            "a.md" => 60,
            "b.md" => 5,
            _ => 20,
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.inner.read(path).await
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), StoreError> {
        self.inner.write(path, content).await
    }

    async fn create_folder(&self, path: &str) -> Result<(), StoreError> {
        self.inner.create_folder(path).await
    }

    async fn list(&self, path: &str) -> Result<Vec<Entry>, StoreError> {
        self.inner.list(path).await
    }
}

#[test]
fn test_path_normalization_is_idempotent() {
    let samples = [
        "note",
        "note.md",
        "/note",
        "//deep/nested/note",
        "Folder/Sub/",
        " spaced name ",
        "README.MD",
        "a.md.md",
        "/",
    ];

    for sample in samples {
        let once = normalize_note_path(sample, ".md");
        assert_eq!(normalize_note_path(&once, ".md"), once, "note path: {:?}", sample);
        assert!(!once.starts_with('/'), "leading separator: {:?}", once);
        assert!(!once.ends_with(".md.md") || sample.ends_with(".md.md"), "doubled extension: {:?}", once);

        let folder = normalize_folder_path(sample);
        assert_eq!(normalize_folder_path(&folder), folder, "folder path: {:?}", sample);
    }
}

#[test]
fn test_validation_reports_first_declared_missing_parameter() {
    let registry = ToolRegistry::new(Arc::new(MemoryStore::new()));
    let err = registry
        .validate(&ToolCall::new("create_note", json!({"mode": "append"})))
        .unwrap_err();
    assert_eq!(err.to_string(), "Missing required parameter: path");
}

#[tokio::test]
async fn test_executions_follow_textual_order_regardless_of_duration() {
    let store = SlowStore {
        inner: MemoryStore::new()
            .with_file("a.md", "A")
            .with_file("b.md", "B")
            .with_file("c.md", "C"),
    };
    let reply = ["a", "b", "c"]
        .iter()
        .map(|p| tool_block("read_note", json!({"path": p})))
        .collect::<Vec<_>>()
        .join("\n");
    let (runner, _) = build_loop(Arc::new(store), MockChatModel::new([reply, "done".to_string()]));

    let result = runner.run(ExecutionContext::new("read all", 5)).await.unwrap();

    let data: Vec<_> = result
        .tool_executions
        .iter()
        .map(|e| e.result.data.clone().unwrap_or_default())
        .collect();
    assert_eq!(data, vec!["A", "B", "C"]);
    assert!(
        result
            .tool_executions
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    );
}

#[tokio::test]
async fn test_unknown_tool_yields_one_failed_execution() {
    let reply = tool_block("summon_dragon", json!({}));
    let (runner, _) = build_loop(Arc::new(MemoryStore::new()), MockChatModel::new([reply, "ok".to_string()]));

    let result = runner.run(ExecutionContext::new("go", 5)).await.unwrap();

    assert_eq!(result.tool_executions.len(), 1);
    let execution = &result.tool_executions[0];
    assert!(!execution.result.success);
    let error = execution.result.message();
    assert!(error.contains("not found"));
    for name in ["read_note", "create_note", "list_folder"] {
        assert!(error.contains(name), "missing {} in {:?}", name, error);
    }
}

#[test]
fn test_malformed_json_never_crashes_parser() {
    let parser = ResponseParser::new();
    let garbage = [
        "",
        "{",
        "}{",
        "not json",
        "{'tool': 'x'}",
        "{\"tool\": \"x\", \"params\": {}",
        "\u{0}\u{1}binary",
        "[[[[",
    ];

    for body in garbage {
        let parsed = parser.parse(&format!("```json:tool\n{}\n```", body));
        assert!(!parsed.has_tool_calls, "body: {:?}", body);
        assert!(
            parsed.errors.iter().any(|e| e.kind == ParseErrorKind::MalformedJson),
            "body: {:?}",
            body
        );
    }
}

#[tokio::test]
async fn test_round_budget_is_respected() {
    for n in 1..=4 {
        let reply = tool_block("list_folder", json!({"path": ""}));
        let (runner, model) = build_loop(Arc::new(MemoryStore::new()), MockChatModel::repeating(reply));

        let result = runner.run(ExecutionContext::new("forever", n)).await.unwrap();

        assert_eq!(model.calls(), n);
        assert_eq!(result.iteration_count, n);
        assert!(result.reached_max_iterations);
    }
}

#[tokio::test]
async fn test_no_tool_calls_short_circuits() {
    let answer = "Here is my answer.\n\n```rust\nfn main() {}\n```\n";
    let (runner, model) = build_loop(Arc::new(MemoryStore::new()), MockChatModel::repeating(answer));

    let result = runner.run(ExecutionContext::new("explain", 5)).await.unwrap();

    assert_eq!(model.calls(), 1);
    assert_eq!(result.final_response, answer);
    assert!(result.tool_executions.is_empty());
    assert!(!result.reached_max_iterations);
}

#[test]
fn test_text_extraction_round_trip() {
    let parser = ResponseParser::new();
    let block = tool_block("read_note", json!({"path": "x"}));
    let cases = [
        block.clone(),
        format!("lead {}", block),
        format!("{} trail", block),
        format!("lead\n{}\nmiddle\n{}\ntrail", block, block),
        format!("{}{}", block, block),
        format!("  a {} b {} c  ", block, block),
    ];

    for response in &cases {
        let blocks = parser.tool_blocks(response);
        let parsed = parser.parse(response);

        let mut spans = String::new();
        let mut rebuilt = String::new();
        let mut last = 0;
        for b in &blocks {
            spans.push_str(&response[last..b.start]);
            rebuilt.push_str(&response[last..b.start]);
            rebuilt.push_str(&response[b.start..b.end]);
            last = b.end;
        }
        spans.push_str(&response[last..]);
        rebuilt.push_str(&response[last..]);

        assert_eq!(parsed.text_content, spans.trim(), "case: {:?}", response);
        assert_eq!(&rebuilt, response);
        assert_eq!(parsed.tool_calls.len(), blocks.len());
    }
}

#[tokio::test]
async fn test_end_to_end_on_disk_vault() {
    let vault = TempDir::new().unwrap();
    std::fs::create_dir_all(vault.path().join("Diary")).unwrap();
    std::fs::write(vault.path().join("Diary/2024-Review.md"), "Shipped v1").unwrap();

    let store = Arc::new(FsStore::new(vault.path()));
    let registry = Arc::new(ToolRegistry::new(store));
    let system = Message::system(agent_system_prompt(registry.definitions()));

    let model = Arc::new(MockChatModel::new([
        format!(
            "Let me look around.\n{}\n{}",
            tool_block("list_folder", json!({"path": "Diary"})),
            tool_block("read_note", json!({"path": "Diary/2024-Review"}))
        ),
        format!(
            "Creating the plan.\n{}",
            tool_block(
                "create_note",
                json!({"path": "Diary/2025-Plan", "content": "# 2025\n\n- Ship v2"})
            )
        ),
        "I created Diary/2025-Plan.md based on last year's review.".to_string(),
    ]));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = ExecutionLoop::new(registry, ResponseParser::new(), model.clone()).with_observer(tx);

    let result = runner
        .run(ExecutionContext::new("Plan 2025 from my review", 5).with_history(vec![system]))
        .await
        .unwrap();

    assert_eq!(result.iteration_count, 3);
    assert_eq!(
        result.final_response,
        "I created Diary/2025-Plan.md based on last year's review."
    );
    assert_eq!(result.tool_executions.len(), 3);
    assert_eq!(result.tool_executions[0].result.data.as_deref(), Some("📄 2024-Review.md"));
    assert_eq!(result.tool_executions[1].result.data.as_deref(), Some("Shipped v1"));
    assert_eq!(
        result.tool_executions[2].result.data.as_deref(),
        Some("File created: Diary/2025-Plan.md")
    );

    let written = std::fs::read_to_string(vault.path().join("Diary/2025-Plan.md")).unwrap();
    assert_eq!(written, "# 2025\n\n- Ship v2");

    let mut observed = Vec::new();
    while let Ok(execution) = rx.try_recv() {
        observed.push(execution.tool_call.tool);
    }
    assert_eq!(observed, vec!["list_folder", "read_note", "create_note"]);

    let transcripts = model.transcripts();
    let last = transcripts.last().unwrap();
    assert_eq!(last[0].role, Role::System);
    assert_eq!(last.len(), 6);
    assert!(last[5].content.contains("File created: Diary/2025-Plan.md"));
}
