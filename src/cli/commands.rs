//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - ask: run the agent loop on a question
//! - tools: print the tool catalogue prompt
//! - parse: show how a saved model reply is parsed

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vaultloop - let a chat model read and write your notes
#[derive(Parser, Debug)]
#[command(name = "vaultloop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a question, letting the model use the note tools
    Ask {
        /// The question or instruction
        question: String,

        /// Vault root directory (overrides agent.vault_dir)
        #[arg(long)]
        vault: Option<PathBuf>,

        /// Note whose content is sent along as context
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// Maximum model/tool rounds (overrides agent.max_iterations)
        #[arg(short, long)]
        max_iterations: Option<usize>,
    },

    /// Print the agent system prompt with the tool catalogue
    Tools,

    /// Parse a saved model reply and show its tool calls
    Parse {
        /// File containing the raw model reply
        file: PathBuf,
    },
}
