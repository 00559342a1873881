//! Motion parameter generation

use crate::config::{LlmSettings, SerConfig};
use crate::conversation::ConversationClient;
use crate::error::Result;
use crate::llm::{ContentPart, Message};
use crate::parsing::{Emotion, MotionParser, MotionResult, OutputParser};
use crate::prompts::GAIT_PROMPT_CN;

/// Turns an utterance plus an emotion into lateral, yaw and step-frequency
/// adjustments.
pub struct MotionGenerator {
    client: ConversationClient,
    parser: MotionParser,
}

impl MotionGenerator {
    /// Create a generator with the built-in Chinese gait prompt.
    pub fn new(settings: LlmSettings) -> Result<Self> {
        Self::with_prompt(settings, GAIT_PROMPT_CN)
    }

    /// Create a generator with a custom gait prompt.
    pub fn with_prompt(settings: LlmSettings, prompt: impl Into<String>) -> Result<Self> {
        let client = ConversationClient::with_system_prompt(settings, prompt)?;
        Ok(Self::with_client(client))
    }

    pub fn from_config(config: &SerConfig) -> Result<Self> {
        Self::with_prompt(config.llm.clone(), config.prompts.gait_prompt())
    }

    pub fn with_client(client: ConversationClient) -> Self {
        Self {
            client,
            parser: MotionParser::new(),
        }
    }

    /// Generate motion parameters for `text` under `emotion` (default normal).
    ///
    /// Replies without a usable gait object yield all zeros.
    pub async fn generate(
        &mut self,
        text: &str,
        emotion: Option<Emotion>,
        stream: bool,
    ) -> Result<MotionResult> {
        let input = annotate(text, emotion.unwrap_or_default());
        let content = vec![ContentPart::text(input)];

        let reply = if stream {
            self.client.send_stream(content).await?.collect_text().await?
        } else {
            self.client.send(content).await?
        };

        Ok(self.parser.parse(&reply))
    }

    pub fn reset_history(&mut self) {
        self.client.reset_history();
    }

    pub fn history(&self) -> Vec<Message> {
        self.client.history()
    }

    pub fn client_mut(&mut self) -> &mut ConversationClient {
        &mut self.client
    }
}

/// `"<text> [EMOTION:<name>]"`, the input format the gait prompt expects
fn annotate(text: &str, emotion: Emotion) -> String {
    format!("{text} [EMOTION:{emotion}]")
}
