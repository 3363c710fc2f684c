//! Model layer - transcript types, the chat model seam and tool-call parsing
//!
//! This module provides:
//! - Message types for the conversation transcript
//! - ChatModel trait for the model service
//! - OpenAiCompatClient, a chat-completions HTTP client
//! - MockChatModel for tests and offline runs
//! - Agent-mode prompt builders
//! - ResponseParser for `json:tool` blocks

pub mod client;
pub mod mock;
pub mod openai;
pub mod prompt;
pub mod tool_parser;
pub mod types;

pub use client::{ChatModel, LlmError};
pub use mock::MockChatModel;
pub use openai::{OpenAiCompatClient, OpenAiCompatConfig};
pub use prompt::{TOOL_FENCE_TAG, agent_system_prompt, build_selection_message, build_user_message};
pub use tool_parser::{ParseError, ParseErrorKind, ParsedResponse, ResponseParser, ToolBlock};
pub use types::{Message, Role};
