//! Vaultloop - an agentic tool-execution loop over a note vault
//!
//! A chat model answers questions about a vault of Markdown notes. When it
//! needs to read, write or browse notes it embeds `json:tool` blocks in its
//! reply; the loop parses them, runs the tools against a document store and
//! feeds the results back until the model gives a final answer.

pub mod error;
pub mod llm;
pub mod runner;
pub mod tools;
pub mod vault;

pub use error::{Result, VaultError};
