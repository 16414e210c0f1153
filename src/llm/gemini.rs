//! Google Gemini backend.
//!
//! Streams answers from `streamGenerateContent` as server-sent events.

use super::{decode_lines, DeltaStream, LlmError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const PROVIDER: &str = "Gemini";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Use the configured key, else `GOOGLE_API_KEY`.
pub fn resolve_api_key(configured: Option<&str>) -> Result<String, LlmError> {
    let present = |key: &str| !key.trim().is_empty();
    configured
        .filter(|key| present(key))
        .map(str::to_string)
        .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|key| present(key)))
        .ok_or(LlmError::MissingApiKey {
            provider: PROVIDER,
            env_var: API_KEY_ENV,
        })
}

pub struct GeminiBackend {
    pub model: String,
    api_key: String,
    base_url: String,
    client: Client,
}

impl GeminiBackend {
    pub fn new(model: String, api_key: String, base_url: String) -> Result<Self, LlmError> {
        // No overall timeout: a long answer can legitimately stream for minutes.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(LlmError::Client)?;

        Ok(Self {
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent",
            self.base_url, self.model
        )
    }

    pub async fn open_stream(&self, prompt: &str) -> Result<DeltaStream, LlmError> {
        let url = self.stream_url();
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!("Opening Gemini stream: {}", url);

        let response = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| LlmError::Connect {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Ok(Box::pin(decode_lines(response.bytes_stream(), parse_sse_line)))
    }
}

fn api_error(status: StatusCode, body: &str) -> LlmError {
    let detail = serde_json::from_str::<GeminiErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = match status.as_u16() {
        401 => format!("Invalid API key ({})", detail),
        403 => format!("API access forbidden ({})", detail),
        429 => format!("Rate limit exceeded ({})", detail),
        _ => detail,
    };
    LlmError::Api {
        provider: PROVIDER,
        status: status.as_u16(),
        message,
    }
}

/// Extract the answer fragment carried by one SSE line, if any.
pub(crate) fn parse_sse_line(line: &str) -> Result<Option<String>, LlmError> {
    let Some(data) = line.strip_prefix("data:") else {
        // Comments, `event:` fields and the blank separator lines.
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() {
        return Ok(None);
    }

    let chunk: GeminiChunk = serde_json::from_str(data)?;
    if let Some(error) = chunk.error {
        return Err(LlmError::Backend(error.message));
    }
    if chunk
        .prompt_feedback
        .and_then(|f| f.block_reason)
        .is_some()
    {
        return Err(LlmError::Blocked);
    }

    let Some(candidate) = chunk.candidates.into_iter().next() else {
        return Ok(None);
    };
    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(LlmError::Blocked);
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    Ok((!text.is_empty()).then_some(text))
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiChunk {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
