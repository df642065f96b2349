use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// csv-chat - Ask natural-language questions about a CSV file
#[derive(Parser, Debug)]
#[command(name = "csv-chat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question about a CSV file
    Ask {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Question to ask about the data
        question: String,

        #[command(flatten)]
        llm: LlmArgs,

        /// Path of the SQLite database file
        #[arg(long, default_value = "data.db")]
        database: PathBuf,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Skip the chart step and show only the result table
        #[arg(long)]
        no_chart: bool,

        /// Show the schema and prompt without calling the model
        #[arg(long)]
        dry_run: bool,

        /// Enable verbose output with row/column counts
        #[arg(short, long)]
        verbose: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// Start an interactive chat session over a CSV file
    Chat {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        llm: LlmArgs,

        /// Path of the SQLite database file
        #[arg(long, default_value = "data.db")]
        database: PathBuf,

        /// Skip the chart step and show only result tables
        #[arg(long)]
        no_chart: bool,

        /// Enable verbose output with row/column counts
        #[arg(short, long)]
        verbose: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// Print the inferred schema and column diagnostics for a CSV file
    Inspect {
        /// Path to the CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Path of the SQLite database file
        #[arg(long, default_value = "data.db")]
        database: PathBuf,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

/// Model provider options shared by the question-driven commands
#[derive(Args, Debug)]
pub struct LlmArgs {
    /// LLM provider to use
    #[arg(short, long, value_enum, default_value = "groq")]
    pub provider: Provider,

    /// API key for the hosted provider
    #[arg(short, long, env = "LLM_API_KEY")]
    pub api_key: Option<String>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama base URL
    #[arg(long, default_value = "http://localhost:11434")]
    pub ollama_url: String
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Provider {
    Groq,
    OpenAI,
    Anthropic,
    Ollama
}

impl Provider {
    /// Get default model for provider
    pub fn default_model(&self) -> &str {
        match self {
            Self::Groq => "llama-3.1-8b-instant",
            Self::OpenAI => "gpt-4",
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Ollama => "llama3.2"
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
