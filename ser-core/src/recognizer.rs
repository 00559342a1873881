//! Text emotion recognition

use crate::config::{LlmSettings, SerConfig};
use crate::conversation::ConversationClient;
use crate::error::{Result, SerError};
use crate::llm::{ContentPart, Message};
use crate::parsing::{EmotionParser, EmotionResult, OutputParser};
use crate::prompts::EMOTION_PROMPT_CN;

/// Classifies user utterances into one of six emotions.
///
/// The model answers conversationally and ends its reply with an
/// `[EMOTION:<n>]` tag, which is stripped from the returned text.
pub struct TextEmotionRecognizer {
    client: ConversationClient,
    parser: EmotionParser,
}

impl TextEmotionRecognizer {
    /// Create a recognizer with the built-in Chinese prompt.
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let client = ConversationClient::with_system_prompt(settings, EMOTION_PROMPT_CN)?;
        Ok(Self::with_client(client))
    }

    /// Create a recognizer from loaded configuration.
    pub fn from_config(config: &SerConfig) -> Result<Self> {
        let client = ConversationClient::with_system_prompt(
            config.llm.clone(),
            config.prompts.emotion_prompt(),
        )?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: ConversationClient) -> Self {
        Self {
            client,
            parser: EmotionParser::new(),
        }
    }

    /// Recognise the emotion of `text`.
    ///
    /// # Errors
    ///
    /// [`SerError::InvalidInput`] for empty text; transport and API errors
    /// are passed through.
    pub async fn recognize(&mut self, text: &str, stream: bool) -> Result<EmotionResult> {
        if text.is_empty() {
            return Err(SerError::InvalidInput("no text provided".to_string()));
        }
        self.recognize_parts(vec![ContentPart::text(text)], stream).await
    }

    /// Recognise the emotion of arbitrary content blocks (text and/or audio).
    pub async fn recognize_parts(
        &mut self,
        parts: Vec<ContentPart>,
        stream: bool,
    ) -> Result<EmotionResult> {
        if parts.is_empty() {
            return Err(SerError::InvalidInput("no content provided".to_string()));
        }

        let reply = if stream {
            self.client.send_stream(parts).await?.collect_text().await?
        } else {
            self.client.send(parts).await?
        };

        let result = self.parser.parse(&reply);
        tracing::debug!(emotion = %result.emotion, "Recognised emotion");
        Ok(result)
    }

    pub fn reset_history(&mut self) {
        self.client.reset_history();
    }

    pub fn history(&self) -> Vec<Message> {
        self.client.history()
    }

    pub fn client(&self) -> &ConversationClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut ConversationClient {
        &mut self.client
    }
}
