//! Google Gemini grammar corrector (`generateContent` REST API).

use super::prompt;
use crate::domain::CorrectionError;
use crate::ports::GrammarCorrector;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiCorrector {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiCorrector {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::with_base(GEMINI_API_BASE.to_string(), api_key, model, timeout)
    }

    pub fn with_base(api_base: String, api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            client: prompt::http_client(timeout),
            api_base,
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[async_trait::async_trait]
impl GrammarCorrector for GeminiCorrector {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        info!(model = %self.model, text_len = text.len(), "sending text to Gemini for correction");

        let request = GenerateRequest {
            system_instruction: Content {
                parts: vec![Part {
                    text: prompt::system_prompt().to_string(),
                }],
            },
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt::user_prompt(text),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: prompt::TEMPERATURE,
                max_output_tokens: prompt::MAX_TOKENS,
                response_mime_type: "application/json".to_string(),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                CorrectionError::ServiceUnavailable(format!("HTTP request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(prompt::error_from_response(response).await);
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            CorrectionError::ServiceUnavailable(format!("Failed to parse API response: {}", e))
        })?;

        let raw_content = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                CorrectionError::ServiceUnavailable("No candidates returned".to_string())
            })?;

        debug!(raw_len = raw_content.len(), "received Gemini correction");
        prompt::parse_correction(&raw_content)
    }

    fn provider(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let g = GeminiCorrector::with_base(
            "https://example.test/v1beta/".into(),
            "k".into(),
            GEMINI_DEFAULT_MODEL.into(),
            Duration::from_secs(1),
        );
        assert_eq!(
            g.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_uses_camel_case() {
        let request = GenerateRequest {
            system_instruction: Content { parts: vec![] },
            contents: vec![],
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 500,
                response_mime_type: "application/json".into(),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 500);
        assert!(json.get("systemInstruction").is_some());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"corrected_message\":\"Hi.\"}"}],"role":"model"}}]}"#;
        let body: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = &body.candidates[0].content.parts[0].text;
        assert_eq!(prompt::parse_correction(text).unwrap(), "Hi.");
    }
}
