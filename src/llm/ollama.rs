//! Ollama backend implementation.
//!
//! Ollama is a local LLM server; `/api/generate` with `stream: true` answers
//! with one JSON object per line.

use super::{decode_lines, DeltaStream, LlmError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "Ollama";

pub struct OllamaBackend {
    pub model: String,
    host: String,
    client: Client,
}

impl OllamaBackend {
    pub fn new(model: String, host: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(LlmError::Client)?;

        Ok(Self {
            model,
            host: host.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn open_stream(&self, prompt: &str) -> Result<DeltaStream, LlmError> {
        let url = format!("{}/api/generate", self.host);

        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: true,
        };

        debug!("Opening Ollama stream: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|source| LlmError::Connect {
                provider: PROVIDER,
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OllamaChunk>(&body)
                .ok()
                .and_then(|c| c.error)
                .unwrap_or(body);
            return Err(LlmError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message,
            });
        }

        Ok(Box::pin(decode_lines(response.bytes_stream(), parse_ndjson_line)))
    }
}

/// Extract the answer fragment from one line of Ollama's streamed output.
pub(crate) fn parse_ndjson_line(line: &str) -> Result<Option<String>, LlmError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let chunk: OllamaChunk = serde_json::from_str(line)?;
    if let Some(error) = chunk.error {
        return Err(LlmError::Backend(error));
    }
    Ok(chunk.response.filter(|text| !text.is_empty()))
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaChunk {
    response: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
    error: Option<String>,
}
