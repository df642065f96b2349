//! LLM provider integrations for query and chart synthesis.
//!
//! This module provides a unified interface for interacting with multiple LLM
//! providers. It handles authentication, request formatting, and response
//! parsing. Each synthesis performs exactly one call; transient failures are
//! surfaced to the caller rather than retried.
//!
//! # Supported Providers
//!
//! | Provider | Endpoint | Authentication |
//! |----------|----------|----------------|
//! | Groq | `api.groq.com` | Bearer token |
//! | OpenAI | `api.openai.com` | Bearer token |
//! | Anthropic | `api.anthropic.com` | x-api-key header |
//! | Ollama | Local (configurable) | None |
//!
//! Completions are requested with temperature 0 so the same question over
//! the same schema keeps producing the same statement.
//!
//! # Example
//!
//! ```
//! use csv_chat::llm::{LlmClient, LlmProvider};
//!
//! let provider = LlmProvider::Ollama {
//!     base_url: "http://localhost:11434".into(),
//!     model:    "llama3.2".into()
//! };
//!
//! let client = LlmClient::new(provider);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppResult, http_error, llm_api_error};

/// LLM provider configuration with authentication credentials.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Groq API (OpenAI-compatible chat completions)
    Groq {
        /// API key
        api_key: String,
        /// Model identifier (e.g., "llama-3.1-8b-instant")
        model:   String
    },
    /// OpenAI API (GPT-4, GPT-3.5, etc.)
    OpenAI {
        /// API key (sk-...)
        api_key: String,
        /// Model identifier (e.g., "gpt-4", "gpt-3.5-turbo")
        model:   String
    },
    /// Anthropic API (Claude models)
    Anthropic {
        /// API key
        api_key: String,
        /// Model identifier (e.g., "claude-sonnet-4-20250514")
        model:   String
    },
    /// Local Ollama instance
    Ollama {
        /// Base URL (e.g., "http://localhost:11434")
        base_url: String,
        /// Model name (e.g., "llama3.2", "codellama")
        model:    String
    }
}

/// HTTP client for LLM API communication.
///
/// Handles provider-specific request formatting and response parsing.
pub struct LlmClient {
    provider: LlmProvider,
    client:   reqwest::Client
}

#[derive(Serialize)]
struct ChatRequest {
    model:       String,
    messages:    Vec<ChatRequestMessage>,
    temperature: f32
}

#[derive(Serialize)]
struct ChatRequestMessage {
    role:    String,
    content: String
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String
}

#[derive(Serialize)]
struct AnthropicRequest {
    model:       String,
    max_tokens:  u32,
    temperature: f32,
    messages:    Vec<AnthropicMessage>
}

#[derive(Serialize)]
struct AnthropicMessage {
    role:    String,
    content: String
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: String
}

#[derive(Serialize)]
struct OllamaRequest {
    model:  String,
    prompt: String,
    stream: bool
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String
}

impl LlmClient {
    /// Create new LLM client
    pub fn new(provider: LlmProvider) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { provider, client }
    }

    /// Request a single completion for `prompt`
    pub async fn complete(&self, prompt: &str) -> AppResult<String> {
        match &self.provider {
            LlmProvider::Groq {
                api_key,
                model
            } => {
                self.call_chat_completions(
                    "https://api.groq.com/openai/v1/chat/completions",
                    "Groq",
                    api_key,
                    model,
                    prompt
                )
                .await
            }
            LlmProvider::OpenAI {
                api_key,
                model
            } => {
                self.call_chat_completions(
                    "https://api.openai.com/v1/chat/completions",
                    "OpenAI",
                    api_key,
                    model,
                    prompt
                )
                .await
            }
            LlmProvider::Anthropic {
                api_key,
                model
            } => self.call_anthropic(api_key, model, prompt).await,
            LlmProvider::Ollama {
                base_url,
                model
            } => self.call_ollama(base_url, model, prompt).await
        }
    }

    async fn call_chat_completions(
        &self,
        url: &str,
        provider_name: &str,
        api_key: &str,
        model: &str,
        prompt: &str
    ) -> AppResult<String> {
        let request = ChatRequest {
            model:       model.to_string(),
            messages:    vec![ChatRequestMessage {
                role:    String::from("user"),
                content: prompt.to_string()
            }],
            temperature: 0.0
        };
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "{} API error {}: {}",
                provider_name, status, text
            )));
        }
        let result: ChatResponse = response.json().await.map_err(http_error)?;
        result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| llm_api_error(format!("Empty response from {}", provider_name)))
    }

    async fn call_anthropic(&self, api_key: &str, model: &str, prompt: &str) -> AppResult<String> {
        let request = AnthropicRequest {
            model:       model.to_string(),
            max_tokens:  4096,
            temperature: 0.0,
            messages:    vec![AnthropicMessage {
                role:    String::from("user"),
                content: prompt.to_string()
            }]
        };
        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "Anthropic API error {}: {}",
                status, text
            )));
        }
        let result: AnthropicResponse = response.json().await.map_err(http_error)?;
        result
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| llm_api_error("Empty response from Anthropic"))
    }

    async fn call_ollama(&self, base_url: &str, model: &str, prompt: &str) -> AppResult<String> {
        let request = OllamaRequest {
            model:  model.to_string(),
            prompt: prompt.to_string(),
            stream: false
        };
        let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(llm_api_error(format!(
                "Ollama API error {}: {}",
                status, text
            )));
        }
        let result: OllamaResponse = response.json().await.map_err(http_error)?;
        Ok(result.response)
    }
}
