//! CLI module for vaultloop - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
