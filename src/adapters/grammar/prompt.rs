//! Prompt and response handling shared by the LLM-backed correctors.

use crate::domain::CorrectionError;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Temperature for correction requests. Low: we want edits, not rewrites.
pub const TEMPERATURE: f32 = 0.3;

/// Response token cap. Dictated messages are short.
pub const MAX_TOKENS: u32 = 500;

pub fn system_prompt() -> &'static str {
    r#"You are a grammar correction assistant for a personal messaging app.
The input is a speech-to-text transcription of a message the user wants to send.

## Your Task
- Fix grammar, spelling, capitalization, and punctuation.
- Keep the meaning, tone, and language of the original. Do not add or remove content.
- Correct the whole input, including any "send to NAME" or "tell NAME" phrasing.

## Output Format
You MUST respond with valid JSON only. No markdown, no explanations outside JSON.

{"corrected_message": "the corrected text"}

Examples:
- Input: "send message to rahul saying hey can you send me teh files tommorow"
  Output: {"corrected_message": "Send a message to Rahul saying: hey, can you send me the files tomorrow?"}
- Input: "the meeting went good and we closed the deal"
  Output: {"corrected_message": "The meeting went well and we closed the deal."}"#
}

pub fn user_prompt(text: &str) -> String {
    format!("Input (speech-to-text transcription):\n\"{}\"", text)
}

/// Strip markdown fences or surrounding prose from an LLM JSON answer.
pub fn sanitize_json(raw_text: &str) -> String {
    let trimmed = raw_text.trim();

    if trimmed.starts_with("```") {
        let without_prefix = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim().to_string();
        }
        return without_prefix.trim().to_string();
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

#[derive(Deserialize)]
struct LlmCorrection {
    corrected_message: String,
}

/// Extract the corrected message from a raw LLM answer.
pub fn parse_correction(raw_content: &str) -> Result<String, CorrectionError> {
    let clean_json = sanitize_json(raw_content);
    let parsed: LlmCorrection = serde_json::from_str(&clean_json).map_err(|e| {
        warn!(error = %e, json = %clean_json.chars().take(200).collect::<String>(), "JSON parse failed");
        CorrectionError::ServiceUnavailable(format!("unparseable model answer: {}", e))
    })?;
    let corrected = parsed.corrected_message.trim().to_string();
    if corrected.is_empty() {
        return Err(CorrectionError::ServiceUnavailable(
            "model returned an empty correction".into(),
        ));
    }
    Ok(corrected)
}

/// Map a non-success HTTP response to a correction error. 429 is rate limiting.
pub async fn error_from_response(response: reqwest::Response) -> CorrectionError {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        warn!(status = %status, ?retry_after_secs, "grammar API rate limited");
        return CorrectionError::RateLimited { retry_after_secs };
    }
    let text = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %text, "grammar API returned error");
    CorrectionError::ServiceUnavailable(format!(
        "API error {}: {}",
        status,
        text.chars().take(200).collect::<String>()
    ))
}

pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
