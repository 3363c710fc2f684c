//! Execution loop - bounded model/tool rounds for one conversation turn.
//!
//! Each round asks the model with the full transcript, parses its reply for
//! `json:tool` blocks, runs the requested tools strictly in order and appends
//! the reply plus a summary of the results to the transcript. The loop ends
//! when a reply carries no tool calls or the round budget runs out.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{Result, VaultError};
use crate::llm::{ChatModel, Message, ParsedResponse, ResponseParser, build_user_message};
use crate::tools::{ToolCall, ToolExecution, ToolRegistry, ToolResult};

/// Input for one `run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub original_message: String,
    /// Prior transcript; copied, never mutated
    pub conversation_history: Vec<Message>,
    /// Round budget, must be positive
    pub max_iterations: usize,
    /// Content of the active note, prepended to the question when non-blank
    pub file_context: Option<String>,
}

impl ExecutionContext {
    pub fn new(original_message: impl Into<String>, max_iterations: usize) -> Self {
        Self {
            original_message: original_message.into(),
            conversation_history: Vec::new(),
            max_iterations,
            file_context: None,
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.conversation_history = history;
        self
    }

    pub fn with_file_context(mut self, context: impl Into<String>) -> Self {
        self.file_context = Some(context.into());
        self
    }
}

/// Outcome of a completed `run`
#[derive(Debug, Clone, PartialEq)]
pub struct LoopResult {
    pub final_response: String,
    /// Every tool execution in the order it happened
    pub tool_executions: Vec<ToolExecution>,
    /// Number of model invocations made
    pub iteration_count: usize,
    pub reached_max_iterations: bool,
}

/// States of the round state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingModel,
    HasToolCalls,
    Done,
    MaxIterationsReached,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done | LoopState::MaxIterationsReached)
    }
}

/// Outcome of a single round, as returned by [`ExecutionLoop::iterate`]
#[derive(Debug, Clone, PartialEq)]
pub struct Iteration {
    pub response: String,
    pub parsed: ParsedResponse,
    pub executions: Vec<ToolExecution>,
    /// True when the model asked for tools and expects their results
    pub should_continue: bool,
}

/// Drives model/tool rounds against an injected registry and model
pub struct ExecutionLoop<M: ChatModel + ?Sized> {
    registry: Arc<ToolRegistry>,
    parser: ResponseParser,
    model: Arc<M>,
    observer: Option<UnboundedSender<ToolExecution>>,
}

impl<M: ChatModel + ?Sized> ExecutionLoop<M> {
    pub fn new(registry: Arc<ToolRegistry>, parser: ResponseParser, model: Arc<M>) -> Self {
        Self {
            registry,
            parser,
            model,
            observer: None,
        }
    }

    /// Send every tool execution to `observer` as soon as it completes.
    ///
    /// Sending never blocks the loop. A dropped receiver is ignored.
    pub fn with_observer(mut self, observer: UnboundedSender<ToolExecution>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run rounds until the model stops asking for tools or the budget is spent.
    ///
    /// Tool failures are fed back to the model. A model failure aborts the
    /// run; executions made before it were already sent to the observer.
    pub async fn run(&self, context: ExecutionContext) -> Result<LoopResult> {
        if context.max_iterations == 0 {
            return Err(VaultError::InvalidState("max_iterations must be positive".to_string()));
        }

        let ExecutionContext {
            original_message,
            conversation_history,
            max_iterations,
            file_context,
        } = context;

        info!("Starting execution loop (max {} iterations)", max_iterations);

        let mut messages = conversation_history;
        messages.push(Message::user(build_user_message(&original_message, file_context.as_deref())));

        let mut tool_executions = Vec::new();
        let mut final_response = String::new();
        let mut iteration_count = 0;
        let mut pending: Option<(String, Vec<ToolCall>)> = None;
        let mut state = LoopState::AwaitingModel;

        while !state.is_terminal() {
            state = match state {
                LoopState::AwaitingModel => {
                    iteration_count += 1;
                    let response = self.model.chat_with_history(&messages).await?;
                    let parsed = self.parser.parse(&response);

                    for error in &parsed.errors {
                        warn!("Skipping malformed tool block: {}", error.message);
                    }

                    if parsed.has_tool_calls {
                        if !parsed.text_content.is_empty() {
                            final_response = parsed.text_content;
                        }
                        pending = Some((response, parsed.tool_calls));
                        LoopState::HasToolCalls
                    } else {
                        final_response = response;
                        LoopState::Done
                    }
                }
                LoopState::HasToolCalls => {
                    let (response, calls) = pending
                        .take()
                        .ok_or_else(|| VaultError::InvalidState("no tool calls pending".to_string()))?;

                    let round = self.execute_tool_calls(calls).await;
                    messages.push(Message::assistant(response));
                    messages.push(Message::user(format_tool_results(&round)));
                    tool_executions.extend(round);

                    if iteration_count >= max_iterations {
                        LoopState::MaxIterationsReached
                    } else {
                        LoopState::AwaitingModel
                    }
                }
                terminal => terminal,
            };

            tracing::debug!(iteration = iteration_count, state = ?state, "Loop state transition");
        }

        let reached_max_iterations = state == LoopState::MaxIterationsReached;
        info!(
            "Execution loop finished after {} iterations ({} tool executions{})",
            iteration_count,
            tool_executions.len(),
            if reached_max_iterations { ", budget exhausted" } else { "" }
        );

        Ok(LoopResult {
            final_response,
            tool_executions,
            iteration_count,
            reached_max_iterations,
        })
    }

    /// One round without a transcript: ask the model, parse, run any tools
    pub async fn iterate(&self, messages: &[Message]) -> Result<Iteration> {
        let response = self.model.chat_with_history(messages).await?;
        let parsed = self.parser.parse(&response);

        if !parsed.has_tool_calls {
            return Ok(Iteration {
                response,
                parsed,
                executions: Vec::new(),
                should_continue: false,
            });
        }

        let executions = self.execute_tool_calls(parsed.tool_calls.clone()).await;
        Ok(Iteration {
            response,
            parsed,
            executions,
            should_continue: true,
        })
    }

    async fn execute_tool_calls(&self, calls: Vec<ToolCall>) -> Vec<ToolExecution> {
        let mut executions = Vec::with_capacity(calls.len());

        for call in calls {
            let result = self.execute_single_tool(&call).await;
            tracing::info!(tool = %call.tool, success = result.success, "Tool executed");

            let execution = ToolExecution::new(call, result);
            if let Some(observer) = &self.observer
                && observer.send(execution.clone()).is_err()
            {
                debug!("Tool execution observer has gone away");
            }
            executions.push(execution);
        }

        executions
    }

    async fn execute_single_tool(&self, call: &ToolCall) -> ToolResult {
        if !self.registry.has_tool(&call.tool) {
            return ToolResult::failure(format!(
                "Tool not found: {}. Available tools: {}",
                call.tool,
                self.registry.tool_names().join(", ")
            ));
        }

        self.registry.execute(call).await
    }
}

/// Summarise one round of executions as the user message fed back to the model
pub fn format_tool_results(executions: &[ToolExecution]) -> String {
    let entries = executions
        .iter()
        .enumerate()
        .map(|(i, exec)| {
            let status = if exec.result.success { "✅ Success" } else { "❌ Error" };
            format!("Tool {}: {}\n{}\n{}", i + 1, exec.tool_call.tool, status, exec.result.message())
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Tool execution results:\n\n{}", entries)
}
