//! Runner module - the agentic model/tool execution loop.
//!
//! This module provides:
//! - ExecutionLoop, which drives bounded model/tool rounds
//! - ExecutionContext and LoopResult for its input and output
//! - LoopState, the round state machine

mod execution_loop;

pub use execution_loop::{
    ExecutionContext, ExecutionLoop, Iteration, LoopResult, LoopState, format_tool_results,
};
