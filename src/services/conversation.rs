// src/services/conversation.rs
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("API_KEY environment variable not set")]
    MissingCredential,
    #[error("request to conversational provider failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("conversational provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed stream event: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("stream failed: {0}")]
    Stream(String),
}

/// Finite, non-restartable sequence of reply text chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

pub trait ConversationalProvider: Send + Sync {
    fn create_session(
        &self,
        system_prompt: &str,
        model: &str,
    ) -> Result<Box<dyn Conversation>, ChatError>;
}

/// A stateful conversation; each call continues the same history.
#[async_trait]
pub trait Conversation: Send + Sync {
    async fn send_streamed(&self, message: &str) -> Result<ChunkStream, ChatError>;
}
