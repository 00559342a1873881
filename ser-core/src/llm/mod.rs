use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::config::{AudioConfig, StreamOptions};
use crate::error::{Result, SerError};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Audio payload for an `input_audio` content part.
///
/// `data` is either a URL or a `data:` URI with base64 audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInput {
    pub data: String,
    pub format: String,
}

/// A typed content block inside a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    InputAudio { input_audio: AudioInput },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn audio(data: impl Into<String>, format: impl Into<String>) -> Self {
        ContentPart::InputAudio {
            input_audio: AudioInput {
                data: data.into(),
                format: format.into(),
            },
        }
    }
}

/// Message content: a plain string or a list of content blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of all text blocks; audio blocks are skipped.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::InputAudio { .. } => None,
                })
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(s) => s.is_empty(),
            MessageContent::Parts(parts) => parts.is_empty(),
        }
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

/// A message in a conversation (one turn)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: MessageContent,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Request to a completion provider
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Outbound messages, system turn first
    pub messages: Vec<Message>,

    /// Requested output modalities
    pub modalities: Vec<String>,

    /// Audio output configuration
    pub audio: Option<AudioConfig>,

    /// Streaming options (streaming requests only)
    pub stream_options: Option<StreamOptions>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            modalities: vec!["text".to_string()],
            audio: None,
            stream_options: None,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Full (non-streamed) reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Assistant text of the first choice (empty if it had no content);
    /// `None` when the reply carried no choices
    pub text: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl Completion {
    /// Whether the reply carried a choice, even an empty one
    pub fn has_content(&self) -> bool {
        self.text.is_some()
    }

    /// Assistant text, or an empty string
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// One incremental piece of a streamed reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamChunk {
    /// Text delta, if this chunk carried one
    pub delta: Option<String>,
    /// Usage report (usually only on the final chunk)
    pub usage: Option<TokenUsage>,
}

impl StreamChunk {
    pub fn text(delta: impl Into<String>) -> Self {
        Self {
            delta: Some(delta.into()),
            usage: None,
        }
    }

    pub fn has_content(&self) -> bool {
        self.delta.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Boxed stream of reply chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub provider: String,
    pub model_name: String,
}

/// Trait for chat completion backends.
///
/// The conversation client owns history and prompt assembly; providers only
/// turn a fully assembled request into a reply.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Request a complete reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;

    /// Request a streamed reply.
    async fn complete_stream(&self, _request: &CompletionRequest) -> Result<ChunkStream> {
        Err(SerError::Configuration(
            "Streaming not supported by this provider".to_string(),
        ))
    }

    /// Get model information
    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "unknown".to_string(),
            model_name: "unknown".to_string(),
        }
    }
}

pub mod factory;
pub mod providers;

pub use factory::LLMProviderFactory;
