//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.csv-chat.toml` in current directory
//! 4. `~/.config/csv-chat/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [llm]
//! provider = "groq"            # groq, openai, anthropic, ollama
//! model = "llama-3.1-8b-instant"
//! api_key = "gsk_..."          # or use GROQ_API_KEY / LLM_API_KEY env vars
//! ollama_url = "http://localhost:11434"
//!
//! [limits]
//! max_result_rows = 100
//! preview_rows = 5
//! chart_sample_rows = 20
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `LLM_API_KEY` | API key for any hosted provider |
//! | `GROQ_API_KEY` | API key for Groq (used when `LLM_API_KEY` is unset) |
//! | `LLM_PROVIDER` | Provider name |
//! | `LLM_MODEL` | Model identifier |
//! | `OLLAMA_URL` | Ollama base URL |

use std::{env, fs, path::PathBuf};

use serde::Deserialize;

use crate::error::{AppResult, config_error};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm:    LlmConfig,
    #[serde(default)]
    pub limits: LimitsConfig
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub provider:   Option<String>,
    pub api_key:    Option<String>,
    pub model:      Option<String>,
    pub ollama_url: Option<String>
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider:   None,
            api_key:    None,
            model:      None,
            ollama_url: Some(String::from("http://localhost:11434"))
        }
    }
}

/// Row limits for prompts and display
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// LIMIT the model is told to respect in synthesized queries
    pub max_result_rows:   usize,
    /// Rows shown in dataset previews and diagnostics samples
    pub preview_rows:      usize,
    /// Result rows included in the chart-synthesis prompt
    pub chart_sample_rows: usize
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_result_rows:   100,
            preview_rows:      5,
            chart_sample_rows: 20
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.csv-chat.toml)
    /// 3. Config file in home directory (~/.config/csv-chat/config.toml)
    /// 4. Default values
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        // Try to load from home directory config
        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("csv-chat")
                .join("config.toml");

            if home_config.exists() {
                let content = fs::read_to_string(&home_config)
                    .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
                config = toml::from_str(&content)
                    .map_err(|e| config_error(format!("Invalid config file: {}", e)))?;
            }
        }

        // Try to load from current directory config (overrides home config)
        let local_config = PathBuf::from(".csv-chat.toml");
        if local_config.exists() {
            let content = fs::read_to_string(&local_config)
                .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
            config = toml::from_str(&content)
                .map_err(|e| config_error(format!("Invalid config file: {}", e)))?;
        }

        // Override with environment variables
        if let Ok(api_key) = env::var("LLM_API_KEY") {
            config.llm.api_key = Some(api_key);
        } else if let Ok(api_key) = env::var("GROQ_API_KEY") {
            config.llm.api_key = Some(api_key);
        }

        if let Ok(provider) = env::var("LLM_PROVIDER") {
            config.llm.provider = Some(provider);
        }

        if let Ok(model) = env::var("LLM_MODEL") {
            config.llm.model = Some(model);
        }

        if let Ok(url) = env::var("OLLAMA_URL") {
            config.llm.ollama_url = Some(url);
        }

        Ok(config)
    }
}
