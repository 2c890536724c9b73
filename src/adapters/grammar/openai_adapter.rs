//! OpenAI-compatible grammar corrector.
//!
//! Defaults to Groq (Llama), but works with any chat-completions endpoint:
//! OpenAI, Azure OpenAI, or a local Ollama instance.

use super::prompt;
use crate::domain::CorrectionError;
use crate::ports::GrammarCorrector;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Chat-completions corrector.
pub struct OpenAiCorrector {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    provider: String,
}

impl OpenAiCorrector {
    /// Create a new corrector.
    ///
    /// # Arguments
    /// * `api_url` - Endpoint (e.g. "https://api.groq.com/openai/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g. "llama-3.1-8b-instant", "gpt-4o-mini")
    /// * `timeout` - Whole-request timeout
    pub fn new(api_url: String, api_key: String, model: String, timeout: Duration) -> Self {
        let provider = if api_url.contains("groq.com") {
            "groq"
        } else {
            "openai-compatible"
        };
        Self {
            client: prompt::http_client(timeout),
            api_url,
            api_key,
            model,
            provider: provider.to_string(),
        }
    }

    /// Groq with its free-tier friendly default model.
    pub fn groq(api_key: String, timeout: Duration) -> Self {
        Self::new(
            GROQ_API_URL.to_string(),
            api_key,
            GROQ_DEFAULT_MODEL.to_string(),
            timeout,
        )
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

#[async_trait::async_trait]
impl GrammarCorrector for OpenAiCorrector {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        info!(
            provider = %self.provider,
            model = %self.model,
            text_len = text.len(),
            "sending text for grammar correction"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt::system_prompt().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt::user_prompt(text),
                },
            ],
            temperature: prompt::TEMPERATURE,
            max_tokens: prompt::MAX_TOKENS,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        let mut builder = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .json(&request);
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let response = builder.send().await.map_err(|e| {
            CorrectionError::ServiceUnavailable(format!("HTTP request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(prompt::error_from_response(response).await);
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            CorrectionError::ServiceUnavailable(format!("Failed to parse API response: {}", e))
        })?;

        let raw_content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| {
                CorrectionError::ServiceUnavailable("No response choices returned".to_string())
            })?;

        debug!(raw_len = raw_content.len(), "received correction");
        prompt::parse_correction(&raw_content)
    }

    fn provider(&self) -> &str {
        &self.provider
    }
}
