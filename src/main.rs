//! Cloudask - Entry Point
//!
//! Loads configuration, builds the pipeline and answers questions either
//! once (question given on the command line) or in an interactive loop.

use cloudask::core::config::AskConfig;
use cloudask::core::error::{AskError, Result};
use cloudask::core::types::AnswerTriple;
use cloudask::llm::LlmClient;
use cloudask::pipeline::{Pipeline, RemoteExecutor};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "cloudask.toml";

/// Ask questions about your cloud infrastructure in plain language
#[derive(Parser, Debug)]
#[command(name = "cloudask")]
#[command(about = "Translate questions into read-only gcloud commands and summarize the results")]
struct Args {
    /// Question to answer; starts an interactive prompt when omitted
    question: Vec<String>,

    /// TOML config file (defaults to ./cloudask.toml when present)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the execution service URL
    #[arg(long)]
    executor_url: Option<String>,

    /// Override the language model
    #[arg(long)]
    model: Option<String>,

    /// Override the audit log directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the synthesized command
    #[arg(long)]
    show_command: bool,

    /// Print the raw execution result
    #[arg(long)]
    show_raw: bool,

    /// Print the full (command, result, answer) triple as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn load_config(&self) -> Result<AskConfig> {
        let config = match &self.config {
            Some(path) => AskConfig::load(path)?,
            None if PathBuf::from(DEFAULT_CONFIG_FILE).exists() => {
                AskConfig::load(&PathBuf::from(DEFAULT_CONFIG_FILE))?
            }
            None => AskConfig::default(),
        };
        let mut config = config.with_env();

        if let Some(url) = &self.executor_url {
            config.executor.url = url.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.audit.log_dir = dir.clone();
        }
        Ok(config)
    }
}

fn main() {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cloudask=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.load_config()?;
    let pipeline = Pipeline::from_config(&config)?;
    tracing::info!(
        model = %config.llm.model,
        executor = %config.executor.url,
        log_dir = %config.audit.log_dir.display(),
        "cloudask ready"
    );

    let rt = Runtime::new()?;

    if !args.question.is_empty() {
        let question = args.question.join(" ");
        let triple = rt.block_on(pipeline.ask(&question))?;
        print_triple(args, &triple)?;
        return Ok(());
    }

    interactive(args, &rt, &pipeline)
}

fn interactive(
    args: &Args,
    rt: &Runtime,
    pipeline: &Pipeline<LlmClient, RemoteExecutor>,
) -> Result<()> {
    println!("\n=== CLOUDASK ===");
    println!("Ask anything about your GCP resources, e.g. \"List all active VMs\".");
    println!("Type quit / q to exit.");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input == "quit" || input == "q" || input == "exit" {
            break;
        }

        match rt.block_on(pipeline.ask(input)) {
            Ok(triple) => print_triple(args, &triple)?,
            Err(AskError::EmptyQuestion) => println!("Please enter a question."),
            Err(e) => println!("Error: {}", e),
        }
        println!();
    }

    Ok(())
}

fn print_triple(args: &Args, triple: &AnswerTriple) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(triple)?);
        return Ok(());
    }

    if args.show_command {
        println!("Command: {}", triple.command);
    }
    if args.show_raw {
        println!("Result:\n{}", serde_json::to_string_pretty(&triple.result)?);
    }
    println!("{}", triple.answer);
    Ok(())
}
