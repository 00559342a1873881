//! # SER - Speech Emotion Recognition for Legged Robots
//!
//! Turns free-text (and optionally audio) utterances into:
//! - a discrete emotion label (normal, happy, tired, confident, afraid, shy)
//! - a small gait command for a walking robot
//!
//! Interpretation is delegated to a hosted OpenAI-compatible chat model;
//! this crate owns the conversation state and parses the model's replies.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ser_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Reads DASHSCOPE_API_KEY unless a key is configured
//!     let config = SerConfig::load()?;
//!     let mut gait = GaitGenerator::from_config(&config)?;
//!
//!     let command = gait.generate("快向左转！", false).await?;
//!     println!("{} -> yaw {}", command.emo_label, command.yaw_vel);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **llm**: provider trait and the OpenAI-compatible HTTP provider
//! - **conversation**: client with bounded history and streamed replies
//! - **parsing**: emotion tag and gait JSON parsers
//! - **recognizer** / **motion** / **gait**: the pipelines built on top

pub mod config;
pub mod conversation;
pub mod error;
pub mod gait;
pub mod llm;
pub mod motion;
pub mod parsing;
pub mod prompts;
pub mod recognizer;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{AudioConfig, LlmSettings, PromptSettings, SerConfig, StreamOptions};
    pub use crate::conversation::{ConversationClient, History, ReplyStream, SendOptions};
    pub use crate::error::{Result, SerError};
    pub use crate::gait::{GaitGenerator, GaitHistory, GaitResult, X_VEL};
    pub use crate::llm::providers::{OpenAIProvider, ScriptedProvider};
    pub use crate::llm::{
        Completion, CompletionRequest, ContentPart, LLMProvider, LLMProviderFactory, Message,
        MessageContent, MessageRole, StreamChunk,
    };
    pub use crate::motion::MotionGenerator;
    pub use crate::parsing::{
        Emotion, EmotionParser, EmotionResult, MotionParser, MotionResult, OutputParser,
    };
    pub use crate::prompts::PromptLanguage;
    pub use crate::recognizer::TextEmotionRecognizer;
}
