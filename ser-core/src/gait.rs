//! Gait generation: emotion recognition followed by motion generation

use serde::{Deserialize, Serialize};

use crate::config::{LlmSettings, SerConfig};
use crate::error::Result;
use crate::llm::Message;
use crate::motion::MotionGenerator;
use crate::parsing::Emotion;
use crate::recognizer::TextEmotionRecognizer;

/// Fixed forward velocity
pub const X_VEL: f64 = 0.8;

/// Full gait command for the locomotion controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaitResult {
    pub x_vel: f64,
    pub y_vel: f64,
    pub yaw_vel: f64,
    pub freq_offset: f64,
    /// Serialized as the emotion name (`"happy"`, ...)
    pub emo_label: Emotion,
}

/// Histories of both underlying conversations
#[derive(Debug, Clone, Serialize)]
pub struct GaitHistory {
    pub emotion: Vec<Message>,
    pub motion: Vec<Message>,
}

/// Two-stage pipeline over two independent conversations.
pub struct GaitGenerator {
    recognizer: TextEmotionRecognizer,
    motion: MotionGenerator,
}

impl GaitGenerator {
    /// Build both stages from the same settings with the built-in prompts.
    pub fn new(settings: LlmSettings) -> Result<Self> {
        Ok(Self {
            recognizer: TextEmotionRecognizer::new(settings.clone())?,
            motion: MotionGenerator::new(settings)?,
        })
    }

    pub fn from_config(config: &SerConfig) -> Result<Self> {
        Ok(Self {
            recognizer: TextEmotionRecognizer::from_config(config)?,
            motion: MotionGenerator::from_config(config)?,
        })
    }

    pub fn from_parts(recognizer: TextEmotionRecognizer, motion: MotionGenerator) -> Self {
        Self { recognizer, motion }
    }

    /// Recognise the emotion of `text`, then generate motion for it.
    ///
    /// Motion values are passed through without range checks.
    pub async fn generate(&mut self, text: &str, stream: bool) -> Result<GaitResult> {
        let emotion = self.recognizer.recognize(text, stream).await?.emotion;
        let motion = self.motion.generate(text, Some(emotion), stream).await?;

        tracing::debug!(%emotion, ?motion, "Generated gait");
        Ok(GaitResult {
            x_vel: X_VEL,
            y_vel: motion.y_vel,
            yaw_vel: motion.yaw_vel,
            freq_offset: motion.freq_offset,
            emo_label: emotion,
        })
    }

    pub fn reset_history(&mut self) {
        self.recognizer.reset_history();
        self.motion.reset_history();
    }

    pub fn history(&self) -> GaitHistory {
        GaitHistory {
            emotion: self.recognizer.history(),
            motion: self.motion.history(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationClient;
    use crate::error::SerError;
    use crate::llm::providers::ScriptedProvider;
    use crate::prompts::{EMOTION_PROMPT_CN, GAIT_PROMPT_CN};
    use std::sync::Arc;

    fn scripted_client(reply: &str, prompt: &str) -> (ConversationClient, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new([reply]));
        let client =
            ConversationClient::with_provider(provider.clone(), LlmSettings::default(), prompt);
        (client, provider)
    }

    fn generator(
        emotion_reply: &str,
        motion_reply: &str,
    ) -> (GaitGenerator, Arc<ScriptedProvider>) {
        let (emotion_client, _) = scripted_client(emotion_reply, EMOTION_PROMPT_CN);
        let (motion_client, motion_provider) = scripted_client(motion_reply, GAIT_PROMPT_CN);
        let generator = GaitGenerator::from_parts(
            TextEmotionRecognizer::with_client(emotion_client),
            MotionGenerator::with_client(motion_client),
        );
        (generator, motion_provider)
    }

    #[tokio::test]
    async fn test_generate_merges_stages() {
        let (mut generator, motion_provider) = generator(
            "好呀，我们走！[EMOTION:1]",
            r#"好的 {"y_vel": 0.1, "yaw_vel": 0.2, "freq_offset": 0.05}"#,
        );

        let gait = generator.generate("快向左转！", false).await.unwrap();
        assert_eq!(
            gait,
            GaitResult {
                x_vel: X_VEL,
                y_vel: 0.1,
                yaw_vel: 0.2,
                freq_offset: 0.05,
                emo_label: Emotion::Happy,
            }
        );
        assert_eq!(
            motion_provider.requests()[0].messages[1].content.text(),
            "快向左转！ [EMOTION:happy]"
        );
    }

    #[tokio::test]
    async fn test_serializes_emotion_name() {
        let (mut generator, _) = generator("[EMOTION:5]", "no object");
        let gait = generator.generate("谢谢夸奖", true).await.unwrap();

        let json = serde_json::to_value(gait).unwrap();
        assert_eq!(json["emo_label"], "shy");
        assert_eq!(json["x_vel"], 0.8);
        assert_eq!(json["y_vel"], 0.0);
    }

    #[tokio::test]
    async fn test_history_and_reset() {
        let (mut generator, _) =
            generator("ok [EMOTION:0]", r#"{"y_vel":0,"yaw_vel":0,"freq_offset":0}"#);
        generator.generate("走", false).await.unwrap();

        let history = generator.history();
        assert_eq!(history.emotion.len(), 2);
        assert_eq!(history.motion.len(), 2);

        generator.reset_history();
        let history = generator.history();
        assert!(history.emotion.is_empty());
        assert!(history.motion.is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_fails_before_motion() {
        let (mut generator, motion_provider) = generator("unused", "unused");
        let result = generator.generate("", false).await;
        assert!(matches!(result, Err(SerError::InvalidInput(_))));
        assert!(motion_provider.requests().is_empty());
    }
}
