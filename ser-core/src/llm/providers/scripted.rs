//! Scripted provider that replays canned replies

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, SerError};
use crate::llm::{ChunkStream, Completion, CompletionRequest, LLMProvider, ModelInfo, StreamChunk};

/// Replays a fixed list of replies in order and records every request.
///
/// Useful for driving the pipelines offline. Streamed replies are split into
/// chunks of `chunk_chars` characters.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
    chunk_chars: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
            chunk_chars: 4,
        }
    }

    pub fn with_chunk_chars(mut self, chunk_chars: usize) -> Self {
        self.chunk_chars = chunk_chars.max(1);
        self
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    fn next_reply(&self, request: &CompletionRequest) -> Result<String> {
        lock(&self.requests).push(request.clone());
        lock(&self.replies)
            .pop_front()
            .ok_or_else(|| SerError::Other("scripted provider has no replies left".to_string()))
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let reply = self.next_reply(request)?;
        Ok(Completion {
            text: Some(reply),
            usage: None,
        })
    }

    async fn complete_stream(&self, request: &CompletionRequest) -> Result<ChunkStream> {
        let reply = self.next_reply(request)?;
        let chars: Vec<char> = reply.chars().collect();
        let chunks: Vec<Result<StreamChunk>> = chars
            .chunks(self.chunk_chars)
            .map(|c| Ok(StreamChunk::text(c.iter().collect::<String>())))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "scripted".to_string(),
            model_name: "scripted".to_string(),
        }
    }
}
