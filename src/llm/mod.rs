//! Streaming LLM backends.
//!
//! Every backend turns a prompt into a [`DeltaStream`]: a stream of non-empty
//! text fragments that ends when the answer is complete. Errors that happen
//! before the first byte (bad key, unknown model) come back from
//! [`Backend::open_stream`]; errors after that arrive as stream items.

pub mod gemini;
pub mod ollama;

use crate::config::BackendConfig;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Answer text, one fragment at a time.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} API key not found. Set {env_var} or add api_key to the config file.")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },
    #[error("failed to create HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("failed to connect to {provider}")]
    Connect {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} request failed with status {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },
    #[error("stream interrupted: {0}")]
    Transport(#[source] BoxError),
    #[error("malformed stream chunk: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response blocked by safety filters")]
    Blocked,
    #[error("{0}")]
    Backend(String),
}

/// Enum-based dispatch over the supported providers.
pub enum Backend {
    Gemini(gemini::GeminiBackend),
    Ollama(ollama::OllamaBackend),
}

impl Backend {
    /// Start generating an answer to `prompt`.
    pub async fn open_stream(&self, prompt: &str) -> Result<DeltaStream, LlmError> {
        match self {
            Backend::Gemini(b) => b.open_stream(prompt).await,
            Backend::Ollama(b) => b.open_stream(prompt).await,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Gemini(_) => "gemini",
            Backend::Ollama(_) => "ollama",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Backend::Gemini(b) => &b.model,
            Backend::Ollama(b) => &b.model,
        }
    }
}

/// Create a backend from configuration, optionally overriding the model.
pub fn create_backend(
    config: &BackendConfig,
    model_override: Option<String>,
) -> Result<Backend, LlmError> {
    match config {
        BackendConfig::Gemini {
            model,
            api_key,
            base_url,
        } => Ok(Backend::Gemini(gemini::GeminiBackend::new(
            model_override.unwrap_or_else(|| model.clone()),
            gemini::resolve_api_key(api_key.as_deref())?,
            base_url.clone(),
        )?)),
        BackendConfig::Ollama { model, host } => Ok(Backend::Ollama(ollama::OllamaBackend::new(
            model_override.unwrap_or_else(|| model.clone()),
            host.clone(),
        )?)),
    }
}

/// Accumulates raw bytes and hands back complete lines.
///
/// Splitting happens on bytes, so a multi-byte character cut in half by a
/// chunk boundary is reassembled before decoding.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            lines.push(decode_line(&line));
        }
        lines
    }

    /// Whatever is left once the byte stream has ended.
    pub(crate) fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = decode_line(&self.buf);
        self.buf.clear();
        Some(line)
    }
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

/// Turn a byte stream of line-oriented records into answer fragments.
///
/// `parse` maps one line to an optional fragment. The first error, from the
/// transport or from `parse`, is yielded and ends the stream.
pub(crate) fn decode_lines<S, B, E, F>(
    bytes: S,
    mut parse: F,
) -> impl Stream<Item = Result<String, LlmError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
    F: FnMut(&str) -> Result<Option<String>, LlmError> + Send + 'static,
{
    async_stream::stream! {
        futures::pin_mut!(bytes);
        let mut lines = LineBuffer::default();
        loop {
            let (batch, ended) = match bytes.next().await {
                Some(Ok(chunk)) => (lines.push(chunk.as_ref()), false),
                Some(Err(e)) => {
                    yield Err(LlmError::Transport(e.into()));
                    return;
                }
                None => (lines.finish().into_iter().collect::<Vec<_>>(), true),
            };
            for line in batch {
                match parse(&line) {
                    Ok(Some(text)) if !text.is_empty() => {
                        yield Ok(text);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
            if ended {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Vec<u8>, io::Error>> + Send + 'static {
        let owned: Vec<Result<Vec<u8>, io::Error>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        stream::iter(owned)
    }

    fn echo(line: &str) -> Result<Option<String>, LlmError> {
        Ok(Some(line.to_string()))
    }

    #[test]
    fn test_line_buffer_joins_split_lines() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"hel").is_empty());
        assert_eq!(buf.push(b"lo\r\nwor"), vec!["hello".to_string()]);
        assert_eq!(buf.finish(), Some("wor".to_string()));
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn test_line_buffer_reassembles_utf8() {
        let mut buf = LineBuffer::default();
        let bear = "ʕ·ᴥ·ʔ\n".as_bytes();
        assert!(buf.push(&bear[..2]).is_empty());
        assert_eq!(buf.push(&bear[2..]), vec!["ʕ·ᴥ·ʔ".to_string()]);
    }

    #[tokio::test]
    async fn test_decode_lines_in_order() {
        let out: Vec<_> = decode_lines(chunks(&["a\nb", "\nc"]), echo).collect().await;
        let out: Vec<String> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_decode_lines_skips_empty_fragments() {
        let out: Vec<_> = decode_lines(chunks(&["\n\nx\n"]), echo).collect().await;
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn test_decode_lines_stops_at_transport_error() {
        let items: Vec<Result<Vec<u8>, io::Error>> = vec![
            Ok(b"first\n".to_vec()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            Ok(b"never\n".to_vec()),
        ];
        let out: Vec<_> = decode_lines(stream::iter(items), echo).collect().await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_deref().unwrap(), "first");
        assert!(matches!(out[1], Err(LlmError::Transport(_))));
    }

    #[tokio::test]
    async fn test_decode_lines_stops_at_parse_error() {
        let parse = |line: &str| {
            if line == "bad" {
                Err(LlmError::Backend("bad line".to_string()))
            } else {
                Ok(Some(line.to_string()))
            }
        };
        let out: Vec<_> = decode_lines(chunks(&["ok\nbad\nafter\n"]), parse).collect().await;
        assert_eq!(out.len(), 2);
        assert!(matches!(&out[1], Err(LlmError::Backend(m)) if m == "bad line"));
    }
}
