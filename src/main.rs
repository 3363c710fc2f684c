use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

use vaultloop::llm::{Message, OpenAiCompatClient, ResponseParser, agent_system_prompt};
use vaultloop::runner::{ExecutionContext, ExecutionLoop};
use vaultloop::tools::{ToolExecution, ToolRegistry, standard_definitions};
use vaultloop::vault::FsStore;

fn setup_logging(config: &Config) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vaultloop")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("vaultloop.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::new();
    if let Some(level) = &config.log_level {
        builder.parse_filters(level);
    }
    builder
        .parse_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Ask {
            question,
            vault,
            context_file,
            max_iterations,
        } => {
            handle_ask_command(
                question,
                vault.as_deref(),
                context_file.as_deref(),
                *max_iterations,
                cli.is_verbose(),
                config,
            )
            .await
        }
        Commands::Tools => handle_tools_command(config),
        Commands::Parse { file } => handle_parse_command(file),
    }
}

async fn handle_ask_command(
    question: &str,
    vault: Option<&Path>,
    context_file: Option<&Path>,
    max_iterations: Option<usize>,
    verbose: bool,
    config: &Config,
) -> Result<()> {
    let vault_dir = vault.map(Path::to_path_buf).unwrap_or_else(|| config.agent.vault_dir.clone());
    if !vault_dir.is_dir() {
        eyre::bail!("Vault directory not found: {}", vault_dir.display());
    }

    let file_context = context_file
        .map(|path| fs::read_to_string(path).context(format!("Failed to read context file {}", path.display())))
        .transpose()?;

    let store = Arc::new(FsStore::new(&vault_dir));
    info!("Asking against vault {}: {}", store.root().display(), question);
    let registry = Arc::new(ToolRegistry::new(store).with_extension(config.agent.note_extension.clone()));
    let model = Arc::new(OpenAiCompatClient::new(config.llm.client_config()).context("Failed to create model client")?);
    info!("Using model {}", model.model());

    let (tx, mut rx) = mpsc::unbounded_channel::<ToolExecution>();
    let printer = tokio::spawn(async move {
        while let Some(execution) = rx.recv().await {
            print_execution(&execution, verbose);
        }
    });

    let history = vec![Message::system(agent_system_prompt(registry.definitions()))];
    let mut context = ExecutionContext::new(question, max_iterations.unwrap_or(config.agent.max_iterations))
        .with_history(history);
    if let Some(text) = file_context {
        context = context.with_file_context(text);
    }

    let execution_loop = ExecutionLoop::new(registry, ResponseParser::new(), model).with_observer(tx);
    let outcome = execution_loop.run(context).await;

    // Dropping the loop closes the observer channel so the printer can finish
    drop(execution_loop);
    printer.await.context("Tool output printer failed")?;

    let result = outcome.context("Agent loop failed")?;

    println!();
    println!("{}", result.final_response);

    if result.reached_max_iterations {
        println!(
            "{}",
            format!("Stopped after {} rounds (iteration limit reached)", result.iteration_count).yellow()
        );
    } else if verbose {
        println!(
            "{}",
            format!(
                "{} rounds, {} tool executions",
                result.iteration_count,
                result.tool_executions.len()
            )
            .dimmed()
        );
    }

    Ok(())
}

fn print_execution(execution: &ToolExecution, verbose: bool) {
    let path = execution
        .tool_call
        .params
        .get("path")
        .and_then(|p| p.as_str())
        .unwrap_or_default();

    if execution.result.success {
        println!("{} {} {}", "✅".green(), execution.tool_call.tool.cyan(), path);
    } else {
        println!("{} {} {}", "❌".red(), execution.tool_call.tool.cyan(), path);
        println!("   {}", execution.result.message().red());
    }

    if verbose && execution.result.success {
        println!("{}", execution.result.message().dimmed());
    }
}

fn handle_tools_command(config: &Config) -> Result<()> {
    info!("Printing tool catalogue");
    let definitions = standard_definitions(&config.agent.note_extension);
    println!("{}", agent_system_prompt(&definitions));
    Ok(())
}

fn handle_parse_command(file: &Path) -> Result<()> {
    info!("Parsing model reply from {}", file.display());
    let response = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let parsed = ResponseParser::new().parse(&response);

    println!("{} {}", "Tool calls:".green(), parsed.tool_calls.len());
    for (i, call) in parsed.tool_calls.iter().enumerate() {
        let params = serde_json::to_string(&call.params).context("Failed to serialize params")?;
        println!("  {}. {} {}", i + 1, call.tool.cyan(), params);
    }

    if !parsed.errors.is_empty() {
        println!("{} {}", "Errors:".red(), parsed.errors.len());
        for error in &parsed.errors {
            println!("  - {}", error.message);
        }
    }

    if !parsed.text_content.is_empty() {
        println!("{}", "Text:".green());
        println!("{}", parsed.text_content);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the configured level is known
    setup_logging(&config).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
