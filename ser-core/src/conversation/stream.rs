//! Streamed reply with single-shot history commit

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::Result;
use crate::llm::{ChunkStream, Message, StreamChunk};

use super::history::History;

/// A streamed assistant reply.
///
/// Yields chunks as they arrive and accumulates their text. The accumulated
/// text is appended to the owning client's history exactly once: when the
/// stream is exhausted, when [`finish`](Self::finish) is called, or when the
/// value is dropped early. Empty replies are not recorded.
///
/// The stream mutably borrows the client, so no other request can be issued
/// until it is gone.
pub struct ReplyStream<'a> {
    inner: ChunkStream,
    history: &'a mut History,
    accumulated: String,
    committed: bool,
}

impl<'a> ReplyStream<'a> {
    pub(crate) fn new(inner: ChunkStream, history: &'a mut History) -> Self {
        Self {
            inner,
            history,
            accumulated: String::new(),
            committed: false,
        }
    }

    /// Text received so far
    pub fn text(&self) -> &str {
        &self.accumulated
    }

    /// Whether the reply has already been written to history
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    fn commit(&mut self) {
        if self.committed {
            return;
        }
        self.committed = true;
        if !self.accumulated.is_empty() {
            self.history.push(Message::assistant(self.accumulated.clone()));
        }
    }

    /// Stop reading, record what was received, and return it.
    pub fn finish(mut self) -> String {
        self.commit();
        std::mem::take(&mut self.accumulated)
    }

    /// Drain the stream and return the full reply text.
    ///
    /// On a transport error the partial text is still recorded (the stream
    /// is dropped) and the error is returned.
    pub async fn collect_text(mut self) -> Result<String> {
        while let Some(chunk) = self.next().await {
            chunk?;
        }
        Ok(self.finish())
    }
}

impl Stream for ReplyStream<'_> {
    type Item = Result<StreamChunk>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.committed {
            return Poll::Ready(None);
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if let Some(delta) = &chunk.delta {
                    this.accumulated.push_str(delta);
                }
                if let Some(usage) = &chunk.usage {
                    tracing::debug!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        total_tokens = usage.total_tokens,
                        "stream usage"
                    );
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
            Poll::Ready(None) => {
                this.commit();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ReplyStream<'_> {
    fn drop(&mut self) {
        self.commit();
    }
}
