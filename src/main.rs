//! # csv-chat
//!
//! Ask natural-language questions about a CSV file and get back a generated
//! SQL query, its result table, and an optional terminal chart.
//!
//! `csv-chat` loads a CSV into a local SQLite database, describes the
//! inferred schema to a hosted LLM, and asks it for exactly one read-only
//! statement per question. The model is untrusted: everything it returns
//! passes through a fail-closed gate (a real statement-kind parse, not
//! keyword matching) before touching the store. Charting is a second model
//! call that returns a small JSON instruction (chart kind plus columns),
//! interpreted by a builder that can only reference result-table columns.
//!
//! # Architecture
//!
//! One question is one round trip:
//!
//! 1. **Load** (once per file) - CSV parsed, column types inferred, rows
//!    written to the `data` table, schema read back from the store.
//! 2. **Synthesize** - schema summary + question prompted to the model,
//!    single statement extracted from the response.
//! 3. **Gate + execute** - statement validated as one read-only retrieval
//!    and run against SQLite.
//! 4. **Chart** - the model may propose a bar, pie, line, scatter, or
//!    histogram over the result; failures here degrade to table-only.
//!
//! # Quick Start
//!
//! ```bash
//! # One-shot question
//! export GROQ_API_KEY="gsk_..."
//! csv-chat ask -f sales.csv "total amount by category"
//!
//! # Interactive session
//! csv-chat chat -f sales.csv
//!
//! # Inspect what was inferred from the file
//! csv-chat inspect -f sales.csv
//!
//! # Show the prompt without calling the model
//! csv-chat ask -f sales.csv "total amount by category" --dry-run
//!
//! # Other providers
//! csv-chat ask -f sales.csv "..." --provider ollama --model llama3.2
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`LLM_API_KEY`, `GROQ_API_KEY`, `LLM_MODEL`, ...)
//! 3. `.csv-chat.toml` in current directory
//! 4. `~/.config/csv-chat/config.toml`
//!
//! ## Example Configuration
//!
//! ```toml
//! [llm]
//! provider = "groq"
//! model = "llama-3.1-8b-instant"
//!
//! [limits]
//! max_result_rows = 100
//! preview_rows = 5
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Any failure (bad file, rejected query, model error)
//!
//! # Modules
//!
//! - [`loader`] - CSV parsing and column type inference
//! - [`store`] - SQLite-backed dataset store
//! - [`schema`] - Dataset schema representation
//! - [`gate`] - Read-only validation of synthesized statements
//! - [`planner`] - Query-synthesis prompts and statement extraction
//! - [`chart`] - Chart synthesis and constrained construction
//! - [`llm`] - LLM provider integrations (Groq, OpenAI, Anthropic, Ollama)
//! - [`session`] - Per-run context and the question round trip
//! - [`output`] - Result formatting and terminal chart rendering
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and constructors

mod chart;
mod cli;
mod config;
mod error;
mod gate;
mod llm;
mod loader;
mod output;
mod planner;
mod schema;
mod session;
mod store;

use std::{
    io::{self, BufRead, Write},
    path::Path,
    process,
    time::Duration
};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::main;
use tracing_subscriber::EnvFilter;

use crate::{
    cli::{Cli, Commands, Format, LlmArgs, Provider},
    config::Config,
    error::{AppResult, config_error},
    llm::{LlmClient, LlmProvider},
    output::{OutputFormat, OutputOptions},
    session::{Answer, Session},
    store::Store
};

#[main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
        )
        .with_writer(io::stderr)
        .init();

    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Ask {
            file,
            question,
            llm,
            database,
            output_format,
            no_chart,
            dry_run,
            verbose,
            no_color
        } => {
            let opts = OutputOptions {
                format: to_output_format(output_format),
                colored: !no_color,
                verbose
            };

            // Dry run mode - load the file and show what would be sent to
            // the model, without needing credentials
            if dry_run {
                let schema = load_into_store(&database, &file)?;
                let prompt = planner::build_query_prompt(
                    &schema.to_summary(),
                    &question,
                    config.limits.max_result_rows
                );
                println!("=== DRY RUN - Would send to LLM ===\n");
                println!("{}", output::format_schema(&schema, &opts));
                println!("Prompt:\n{}", prompt);
                return Ok(0);
            }

            let mut session = open_session(&database, llm, &config)?;
            session.load_dataset(&file)?;
            let answer = with_spinner("Answering...", round_trip(&session, &question, no_chart))
                .await?;
            println!("{}", output::format_answer(&answer, &opts));
            Ok(0)
        }

        Commands::Chat {
            file,
            llm,
            database,
            no_chart,
            verbose,
            no_color
        } => {
            let opts = OutputOptions {
                format: OutputFormat::Text,
                colored: !no_color,
                verbose
            };
            let mut session = open_session(&database, llm, &config)?;
            let schema = session.load_dataset(&file)?;
            println!("Loaded {} ({} rows)\n", file.display(), session.row_count()?);
            println!("{}", output::format_result_table(&session.preview()?, &opts));
            println!("{}", output::format_schema(&schema, &opts));
            chat_loop(&session, no_chart, &opts).await;
            Ok(0)
        }

        Commands::Inspect {
            file,
            database,
            output_format,
            no_color
        } => {
            let opts = OutputOptions {
                format: to_output_format(output_format),
                colored: !no_color,
                verbose: false
            };
            // Inspection never talks to a model
            let mut store = Store::open(&database)?;
            let dataset = loader::load_csv_file(&file)?;
            store.replace_table(&dataset.columns, &dataset.rows)?;
            println!("{}", output::format_schema(&store.schema()?, &opts));
            println!(
                "{}",
                output::format_diagnostics(
                    &store.diagnostics(config.limits.preview_rows)?,
                    &opts
                )
            );
            Ok(0)
        }
    }
}

/// Interactive question loop; per-question failures never end the session
async fn chat_loop(session: &Session, no_chart: bool, opts: &OutputOptions) {
    println!("Ask a question about your data (:schema, :describe, :quit)");
    let stdin = io::stdin();
    loop {
        print!("? ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        match question {
            ":quit" | ":exit" | ":q" => break,
            ":schema" => match session.schema() {
                Ok(schema) => println!("{}", output::format_schema(&schema, opts)),
                Err(e) => print_error(&e, opts)
            },
            ":describe" => match session.diagnostics() {
                Ok(diag) => println!("{}", output::format_diagnostics(&diag, opts)),
                Err(e) => print_error(&e, opts)
            },
            _ => {
                let result =
                    with_spinner("Answering...", round_trip(session, question, no_chart)).await;
                match result {
                    Ok(answer) => println!("{}", output::format_answer(&answer, opts)),
                    Err(e) => print_error(&e, opts)
                }
            }
        }
    }
}

/// One round trip, optionally skipping the chart step
async fn round_trip(session: &Session, question: &str, no_chart: bool) -> AppResult<Answer> {
    if no_chart {
        let sql = session.synthesize(question).await?;
        let (validated, table) = session.execute(&sql)?;
        Ok(Answer {
            question: question.to_string(),
            sql: validated.sql,
            table,
            chart: None
        })
    } else {
        session.answer(question).await
    }
}

fn open_session(database: &Path, llm: LlmArgs, config: &Config) -> AppResult<Session> {
    let store = Store::open(database)?;
    let provider = build_provider(llm, config)?;
    Ok(Session::new(
        store,
        LlmClient::new(provider),
        config.limits.clone()
    ))
}

/// Load a CSV into the store without building a model client
fn load_into_store(database: &Path, file: &Path) -> AppResult<schema::TableSchema> {
    let mut store = Store::open(database)?;
    let dataset = loader::load_csv_file(file)?;
    store.replace_table(&dataset.columns, &dataset.rows)?;
    store.schema()
}

fn build_provider(args: LlmArgs, config: &Config) -> AppResult<LlmProvider> {
    let effective_api_key = args.api_key.or(config.llm.api_key.clone());
    let effective_ollama_url = if args.ollama_url == "http://localhost:11434" {
        config.llm.ollama_url.clone().unwrap_or(args.ollama_url)
    } else {
        args.ollama_url
    };
    let model_name = args
        .model
        .or(config.llm.model.clone())
        .unwrap_or_else(|| args.provider.default_model().to_string());

    match args.provider {
        Provider::Groq => {
            let key = effective_api_key.ok_or_else(|| {
                config_error("API key required for Groq (use --api-key or GROQ_API_KEY)")
            })?;
            Ok(LlmProvider::Groq {
                api_key: key,
                model:   model_name
            })
        }
        Provider::OpenAI => {
            let key = effective_api_key.ok_or_else(|| {
                config_error("API key required for OpenAI (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::OpenAI {
                api_key: key,
                model:   model_name
            })
        }
        Provider::Anthropic => {
            let key = effective_api_key.ok_or_else(|| {
                config_error("API key required for Anthropic (use --api-key or LLM_API_KEY)")
            })?;
            Ok(LlmProvider::Anthropic {
                api_key: key,
                model:   model_name
            })
        }
        Provider::Ollama => Ok(LlmProvider::Ollama {
            base_url: effective_ollama_url,
            model:    model_name
        })
    }
}

async fn with_spinner<T>(
    message: &'static str,
    fut: impl Future<Output = AppResult<T>>
) -> AppResult<T> {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    let result = fut.await;
    pb.finish_and_clear();
    result
}

fn print_error(error: &error::AppError, opts: &OutputOptions) {
    if opts.colored {
        eprintln!("{} {}", "Error:".red().bold(), error);
    } else {
        eprintln!("Error: {}", error);
    }
}

fn to_output_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}
