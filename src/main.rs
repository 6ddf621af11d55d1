use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use factline::answerer::OllamaAnswererBuilder;
use factline::ollama::OllamaClientBuilder;
use factline::retriever::RetrievalConfig;
use factline::{AssistantService, Database};

/// factline - ask questions against flattened notes with a local model
#[derive(Parser)]
#[command(name = "factline")]
#[command(about = "A keyword-retrieval question answering tool for flat note files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask(AskCommand),
    /// Open the interactive chat interface
    Chat,
    /// Flatten a raw notes file into one-line records
    Flatten(FlattenCommand),
    /// Check data file and Ollama health
    Doctor,
}

/// Ask a single question
#[derive(Parser)]
struct AskCommand {
    /// The question to ask
    #[arg(value_name = "QUESTION")]
    question: String,

    /// How many top-scoring record lines to use as context
    #[arg(short = 'k', long, value_name = "N")]
    top_k: Option<usize>,

    /// Print the record line the answer was grounded in
    #[arg(long)]
    show_source: bool,

    /// Print the answer as JSON
    #[arg(long)]
    json: bool,
}

/// Flatten raw notes into the record database
#[derive(Parser)]
struct FlattenCommand {
    /// Path to the raw notes file
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to write the flattened records to
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() {
    // Load .env if present; env vars already set win
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Ask(cmd) => handle_ask(cmd),
        Commands::Chat => factline::tui::run(),
        Commands::Flatten(cmd) => handle_flatten(cmd),
        Commands::Doctor => handle_doctor(),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors include validation failures like an empty question or a
/// missing input file. Internal errors include I/O and network failures.
fn is_user_error(error: &anyhow::Error) -> bool {
    let error_msg = error.to_string();
    error_msg.contains("cannot be empty") || error_msg.contains("Failed to read notes file")
}

/// Handles the ask command by running one question through the pipeline.
fn handle_ask(cmd: &AskCommand) -> Result<()> {
    if cmd.question.trim().is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let data_path = factline::utils::get_data_path()?;
    let db = Database::open(&data_path);

    let client = Arc::new(
        OllamaClientBuilder::new()
            .build()
            .context("Failed to build Ollama client")?,
    );
    let model = client.model().to_string();
    let answerer = OllamaAnswererBuilder::new()
        .client(client)
        .model(model)
        .build();

    let mut config = RetrievalConfig::from_env();
    if let Some(top_k) = cmd.top_k
        && top_k >= 1
    {
        config.top_k = top_k;
    }

    let service = AssistantService::new(db, Arc::new(answerer), config);
    let answer = service.ask(&cmd.question)?;

    if cmd.json {
        let payload = serde_json::json!({
            "question": cmd.question,
            "answer": answer.text,
            "source": answer.source,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", answer.text);
    if cmd.show_source
        && let Some(source) = &answer.source
    {
        println!("Source: {source}");
    }

    Ok(())
}

/// Handles the flatten command by rewriting raw notes as record lines.
fn handle_flatten(cmd: &FlattenCommand) -> Result<()> {
    let input = match &cmd.input {
        Some(path) => path.clone(),
        None => factline::utils::get_notes_path()?,
    };
    let output = match &cmd.output {
        Some(path) => path.clone(),
        None => factline::utils::get_data_path()?,
    };

    factline::utils::ensure_parent_dir(&output)?;
    let records = factline::flatten::flatten_file(&input, &output)?;

    println!("Flattened {} records to {}", records, output.display());

    Ok(())
}

/// Handles the doctor command.
fn handle_doctor() -> Result<()> {
    let data_path = factline::utils::get_data_path()?;
    let db = Database::open(&data_path);
    factline::doctor::run_health_checks(&db)
}
