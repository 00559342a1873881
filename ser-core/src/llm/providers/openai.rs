//! OpenAI-compatible chat completions provider (OpenAI, DashScope compatible mode, ...)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncBufReadExt;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use crate::config::{AudioConfig, LlmSettings, StreamOptions};
use crate::error::{Result, SerError};
use crate::llm::{
    ChunkStream, Completion, CompletionRequest, LLMProvider, Message, ModelInfo, StreamChunk,
    TokenUsage,
};

/// Provider for any endpoint speaking the OpenAI chat completions protocol.
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Build a provider from client settings and an already resolved key.
    ///
    /// Proxy environment variables are ignored and `settings.timeout` is the
    /// deadline for every request.
    pub fn from_settings(settings: &LlmSettings, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest, stream: bool) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: &self.model,
            messages: &request.messages,
            modalities: &request.modalities,
            audio: request.audio.as_ref(),
            stream,
            stream_options: if stream {
                Some(request.stream_options.unwrap_or(StreamOptions {
                    include_usage: true,
                }))
            } else {
                None
            },
        }
    }

    async fn post(&self, request: &CompletionRequest, stream: bool) -> Result<reqwest::Response> {
        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            stream,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.body(request, stream))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = match serde_json::from_str::<OpenAIError>(&text) {
            Ok(error) => match error.error.error_type {
                Some(kind) => format!("{}: {}", kind, error.error.message),
                None => error.error.message,
            },
            Err(_) => text,
        };

        Err(SerError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    modalities: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<&'a AudioConfig>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessageResponse>,
    delta: Option<OpenAIDelta>,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

/// Decode one SSE line. `None` means the line carries nothing for the caller
/// (comments, blank keep-alives, `[DONE]`).
fn decode_sse_line(line: &str) -> Option<Result<StreamChunk>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<OpenAIStreamChunk>(data) {
        Ok(chunk) => {
            let delta = chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta)
                .and_then(|delta| delta.content);
            Some(Ok(StreamChunk {
                delta,
                usage: chunk.usage,
            }))
        }
        Err(e) => Some(Err(SerError::Stream(format!(
            "Failed to parse stream chunk: {}",
            e
        )))),
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let response = self.post(request, false).await?;
        let body: OpenAIResponse = response.json().await?;

        let text = body.choices.into_iter().next().map(|choice| {
            choice
                .message
                .and_then(|message| message.content)
                .unwrap_or_default()
        });

        Ok(Completion {
            text,
            usage: body.usage,
        })
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<ChunkStream> {
        let response = self.post(request, true).await?;

        // Convert response bytes to a stream of lines
        let bytes_stream = response.bytes_stream();
        let reader = tokio_util::io::StreamReader::new(
            bytes_stream.map(|r| r.map_err(std::io::Error::other)),
        );
        let lines = LinesStream::new(tokio::io::BufReader::new(reader).lines());

        let stream = lines.filter_map(|line_result| match line_result {
            Ok(line) => decode_sse_line(&line),
            Err(e) => Some(Err(SerError::Stream(format!("Stream read error: {}", e)))),
        });

        Ok(Box::pin(stream))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "openai-compatible".to_string(),
            model_name: self.model.clone(),
        }
    }
}
