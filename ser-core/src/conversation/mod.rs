//! Conversation Management
//!
//! Multi-turn chat over a completion provider with bounded history.
//!
//! # Features
//!
//! - Fixed system instruction prepended to every request
//! - FIFO history with an optional turn limit
//! - Batch and streamed replies; streamed replies are recorded exactly once
//!
//! # Example
//!
//! ```rust,no_run
//! use ser_core::config::LlmSettings;
//! use ser_core::conversation::ConversationClient;
//! use futures::StreamExt;
//!
//! # async fn run() -> ser_core::error::Result<()> {
//! let mut client = ConversationClient::new(LlmSettings::default())?;
//! let reply = client.send("今天天气真好").await?;
//!
//! let mut stream = client.send_stream("再说一遍").await?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?.delta.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod history;
mod stream;

pub use client::{ConversationClient, SendOptions};
pub use history::History;
pub use stream::ReplyStream;
