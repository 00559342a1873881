//! Conversation Client

use std::sync::Arc;

use crate::config::LlmSettings;
use crate::error::Result;
use crate::llm::{
    ContentPart, CompletionRequest, LLMProvider, LLMProviderFactory, Message, MessageContent,
    MessageRole, ModelInfo,
};
use crate::prompts::EMOTION_PROMPT_CN;

use super::history::History;
use super::stream::ReplyStream;

/// Per-call options for [`ConversationClient::send_with`]
#[derive(Debug, Clone, Copy)]
pub struct SendOptions {
    /// Role of the new turn
    pub role: MessageRole,
    /// Clear history before appending the new turn
    pub reset_history: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            role: MessageRole::User,
            reset_history: false,
        }
    }
}

impl SendOptions {
    pub fn reset() -> Self {
        Self {
            reset_history: true,
            ..Self::default()
        }
    }
}

/// Multi-turn chat client over a completion provider.
///
/// Owns a bounded [`History`] and a system instruction. Every request sends
/// the system turn (unless the prompt is empty) followed by the history,
/// which already contains the new turn.
pub struct ConversationClient {
    provider: Arc<dyn LLMProvider>,
    settings: LlmSettings,
    system_prompt: String,
    history: History,
}

impl ConversationClient {
    /// Create a client using the default emotion recognition prompt.
    ///
    /// # Errors
    ///
    /// Fails with [`SerError::Authentication`](crate::error::SerError::Authentication)
    /// when no API key can be resolved.
    pub fn new(settings: LlmSettings) -> Result<Self> {
        Self::with_system_prompt(settings, EMOTION_PROMPT_CN)
    }

    /// Create a client with an explicit system instruction.
    pub fn with_system_prompt(
        settings: LlmSettings,
        system_prompt: impl Into<String>,
    ) -> Result<Self> {
        let provider = LLMProviderFactory::create(&settings)?;
        Ok(Self::with_provider(provider, settings, system_prompt))
    }

    /// Create a client over an existing provider.
    pub fn with_provider(
        provider: Arc<dyn LLMProvider>,
        settings: LlmSettings,
        system_prompt: impl Into<String>,
    ) -> Self {
        let history = History::new(settings.max_history);
        Self {
            provider,
            settings,
            system_prompt: system_prompt.into(),
            history,
        }
    }

    /// Send a user turn and wait for the full reply.
    pub async fn send(&mut self, content: impl Into<MessageContent>) -> Result<String> {
        self.send_with(content, SendOptions::default()).await
    }

    /// Send a turn with explicit options and wait for the full reply.
    ///
    /// Any reply that carries a choice is appended to history as an
    /// assistant turn, even when its text is empty. A reply without choices
    /// appends nothing. On failure the new turn stays in history.
    pub async fn send_with(
        &mut self,
        content: impl Into<MessageContent>,
        options: SendOptions,
    ) -> Result<String> {
        let request = self.prepare(content.into(), options, false);
        let completion = self.provider.complete(&request).await?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "completion usage"
            );
        }

        let Some(text) = completion.text else {
            return Ok(String::new());
        };
        self.history.push(Message::assistant(text.clone()));
        Ok(text)
    }

    /// Send a user turn and stream the reply.
    pub async fn send_stream(
        &mut self,
        content: impl Into<MessageContent>,
    ) -> Result<ReplyStream<'_>> {
        self.send_stream_with(content, SendOptions::default()).await
    }

    /// Send a turn with explicit options and stream the reply.
    ///
    /// The returned stream records the reply in history once it is exhausted,
    /// finished or dropped.
    pub async fn send_stream_with(
        &mut self,
        content: impl Into<MessageContent>,
        options: SendOptions,
    ) -> Result<ReplyStream<'_>> {
        let request = self.prepare(content.into(), options, true);
        let inner = self.provider.complete_stream(&request).await?;
        Ok(ReplyStream::new(inner, &mut self.history))
    }

    /// Send `text` as a single text block and return the full reply,
    /// streaming under the hood when `stream` is set.
    pub async fn ask(&mut self, text: &str, stream: bool) -> Result<String> {
        let content = vec![ContentPart::text(text)];
        if stream {
            self.send_stream(content).await?.collect_text().await
        } else {
            self.send(content).await
        }
    }

    fn prepare(
        &mut self,
        content: MessageContent,
        options: SendOptions,
        stream: bool,
    ) -> CompletionRequest {
        if options.reset_history {
            self.history.clear();
        }
        self.history.push(Message::new(options.role, content));

        let system = Some(self.system_prompt.as_str()).filter(|p| !p.is_empty());
        tracing::debug!(
            history = self.history.len(),
            system = system.is_some(),
            stream,
            "Preparing conversation request"
        );

        CompletionRequest {
            messages: self.history.to_messages(system),
            modalities: self.settings.modalities.clone(),
            audio: self.settings.audio.clone(),
            stream_options: if stream { self.settings.stream_options } else { None },
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Replace the system instruction; an empty prompt sends no system turn.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = prompt.into();
    }

    /// Change the history capacity, keeping the newest turns.
    pub fn set_max_history(&mut self, max_history: Option<usize>) {
        self.settings.max_history = max_history;
        self.history.set_capacity(max_history);
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Snapshot of the stored turns, oldest first (system turn excluded)
    pub fn history(&self) -> Vec<Message> {
        self.history.to_vec()
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    pub fn model_info(&self) -> ModelInfo {
        self.provider.model_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamOptions;
    use crate::error::SerError;
    use crate::llm::providers::ScriptedProvider;
    use futures::StreamExt;

    fn client(replies: &[&str]) -> (ConversationClient, Arc<ScriptedProvider>) {
        let provider = Arc::new(ScriptedProvider::new(replies.iter().copied()));
        let client = ConversationClient::with_provider(
            provider.clone(),
            LlmSettings::default(),
            "system instruction",
        );
        (client, provider)
    }

    fn roles(messages: &[Message]) -> Vec<MessageRole> {
        messages.iter().map(|m| m.role).collect()
    }

    #[test]
    fn test_new_without_key_fails() {
        let settings = LlmSettings {
            api_key_env: "SER_TEST_UNSET_KEY_VAR_4".to_string(),
            ..LlmSettings::default()
        };
        let result = ConversationClient::new(settings);
        assert!(matches!(result, Err(SerError::Authentication(_))));
    }

    #[test]
    fn test_new_with_key_uses_emotion_prompt() {
        let settings = LlmSettings::default().with_api_key("sk-test");
        let client = ConversationClient::new(settings).unwrap();
        assert_eq!(client.system_prompt(), EMOTION_PROMPT_CN);
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn test_two_turns_fill_history() {
        let (mut client, provider) = client(&["first reply", "second reply"]);

        assert_eq!(client.send("hello").await.unwrap(), "first reply");
        assert_eq!(client.send("again").await.unwrap(), "second reply");

        let history = client.history();
        use MessageRole::*;
        assert_eq!(roles(&history), [User, Assistant, User, Assistant]);
        assert_eq!(history[3].content.text(), "second reply");

        let requests = provider.requests();
        assert_eq!(roles(&requests[0].messages), [System, User]);
        assert_eq!(roles(&requests[1].messages), [System, User, Assistant, User]);
        assert_eq!(requests[1].messages[0].content.text(), "system instruction");
        assert_eq!(requests[1].modalities, vec!["text".to_string()]);
    }

    #[tokio::test]
    async fn test_history_evicts_oldest() {
        let (mut client, provider) = client(&["r1", "r2", "r3"]);
        for prompt in ["q1", "q2", "q3"] {
            client.send(prompt).await.unwrap();
        }

        let history = client.history();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content.text(), "q2");
        assert_eq!(history[3].content.text(), "r3");

        // system turn + at most 4 history turns on the wire
        let last = provider.requests().pop().unwrap();
        assert_eq!(last.messages.len(), 5);
        assert_eq!(last.messages[1].content.text(), "r1");
        assert_eq!(last.messages[0].role, MessageRole::System);
    }

    #[tokio::test]
    async fn test_reset_option_clears_first() {
        let (mut client, provider) = client(&["r1", "r2"]);
        client.send("q1").await.unwrap();
        client.send_with("q2", SendOptions::reset()).await.unwrap();

        let history = client.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content.text(), "q2");
        assert_eq!(provider.requests()[1].messages.len(), 2);
    }

    #[tokio::test]
    async fn test_stream_records_once_exhausted() {
        let (mut client, provider) = client(&["streamed reply"]);
        {
            let mut stream = client.send_stream("hi").await.unwrap();
            let mut deltas = Vec::new();
            while let Some(chunk) = stream.next().await {
                deltas.push(chunk.unwrap().delta.unwrap());
            }
            assert!(deltas.len() > 1);
            assert_eq!(deltas.concat(), "streamed reply");
        }

        let history = client.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].content.text(), "streamed reply");
        assert!(provider.requests()[0].stream_options.is_none());
    }

    #[tokio::test]
    async fn test_stream_dropped_early_records_partial() {
        let provider = Arc::new(ScriptedProvider::new(["abcdef"]).with_chunk_chars(2));
        let mut client =
            ConversationClient::with_provider(provider, LlmSettings::default(), "sys");
        {
            let mut stream = client.send_stream("hi").await.unwrap();
            stream.next().await;
        }
        let history = client.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content.text(), "ab");
    }

    #[tokio::test]
    async fn test_stream_options_forwarded() {
        let provider = Arc::new(ScriptedProvider::new(["ok"]));
        let settings = LlmSettings {
            stream_options: Some(StreamOptions {
                include_usage: false,
            }),
            ..LlmSettings::default()
        };
        let mut client = ConversationClient::with_provider(provider.clone(), settings, "sys");
        assert_eq!(client.ask("hi", true).await.unwrap(), "ok");
        assert_eq!(
            provider.requests()[0].stream_options,
            Some(StreamOptions {
                include_usage: false
            })
        );
    }

    #[tokio::test]
    async fn test_empty_batch_replies_still_recorded() {
        let (mut client, _) = client(&["", ""]);
        assert_eq!(client.send("q1").await.unwrap(), "");
        assert_eq!(client.send("q2").await.unwrap(), "");

        let history = client.history();
        use MessageRole::*;
        assert_eq!(roles(&history), [User, Assistant, User, Assistant]);
        assert_eq!(history[3].content.text(), "");
    }

    #[tokio::test]
    async fn test_empty_stream_reply_not_recorded() {
        let (mut client, _) = client(&[""]);
        assert_eq!(client.ask("q", true).await.unwrap(), "");
        assert_eq!(roles(&client.history()), [MessageRole::User]);
    }

    #[tokio::test]
    async fn test_error_keeps_user_turn() {
        let (mut client, _) = client(&[]);
        assert!(client.send("lost").await.is_err());
        let history = client.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_set_max_history() {
        let (mut client, _) = client(&["r1", "r2"]);
        client.set_max_history(None);
        client.send("q1").await.unwrap();
        client.send("q2").await.unwrap();
        assert_eq!(client.history().len(), 4);

        client.set_max_history(Some(1));
        let history = client.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content.text(), "r2");
        assert_eq!(client.settings().max_history, Some(1));
    }

    #[tokio::test]
    async fn test_empty_system_prompt_sends_no_system_turn() {
        let (mut client, provider) = client(&["r"]);
        client.set_system_prompt("");
        client.send("q").await.unwrap();
        assert_eq!(roles(&provider.requests()[0].messages), [MessageRole::User]);
    }

    #[tokio::test]
    async fn test_reset_history_and_role() {
        let (mut client, _) = client(&["r"]);
        let options = SendOptions {
            role: MessageRole::Assistant,
            reset_history: false,
        };
        client.send_with("primed", options).await.unwrap();
        assert_eq!(client.history()[0].role, MessageRole::Assistant);

        client.reset_history();
        assert!(client.history().is_empty());
        assert_eq!(client.model_info().provider, "scripted");
    }
}
