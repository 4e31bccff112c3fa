//! LLM module - chat-completion types and the OpenRouter client.
//!
//! Messages follow the OpenAI chat-completion wire shape, which OpenRouter
//! accepts for every routed model.

mod openrouter;
mod types;

pub use openrouter::OpenRouterClient;
pub use types::{
    find_orphan_tool_result, ChatMessage, ChatResponse, FunctionCall, FunctionDefinition, ToolCall,
    ToolDefinition,
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the chat-completion API.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to LLM API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LLM API returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("could not decode LLM API response: {0}")]
    Decode(String),

    #[error("LLM API response contained no message")]
    MissingMessage,
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a chat completion request, optionally declaring tools.
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponse, LlmError>;

    /// List the models the backend can route to, as returned upstream.
    async fn list_models(&self) -> Result<serde_json::Value, LlmError>;

    /// Generate an image from a prompt. `Ok(None)` when the model answered
    /// without an image.
    async fn generate_image(&self, model: &str, prompt: &str) -> Result<Option<String>, LlmError>;
}
