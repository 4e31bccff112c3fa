//! Test doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::{ChatMessage, ChatResponse, LlmClient, LlmError, ToolCall, ToolDefinition};

/// One request seen by [`ScriptedLlm`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub with_tools: bool,
}

/// An LLM that replays a fixed script of responses and records every request.
/// Once the script runs out every call fails.
pub struct ScriptedLlm {
    script: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
    images: Mutex<VecDeque<Result<Option<String>, LlmError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedLlm {
    pub fn new(script: Vec<Result<ChatResponse, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            images: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script the results of `generate_image` calls.
    pub fn with_images(self, images: Vec<Result<Option<String>, LlmError>>) -> Self {
        *self.images.lock().unwrap() = images.into();
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            with_tools: tools.is_some_and(|t| !t.is_empty()),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Decode("script exhausted".to_string())))
    }

    async fn list_models(&self) -> Result<Value, LlmError> {
        Ok(json!({"data": [{"id": "openai/gpt-4o"}]}))
    }

    async fn generate_image(&self, model: &str, prompt: &str) -> Result<Option<String>, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            model: model.to_string(),
            messages: vec![ChatMessage::user(prompt)],
            with_tools: false,
        });
        self.images
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Decode("script exhausted".to_string())))
    }
}

/// Shorthand for a model response requesting one tool call.
pub fn tool_call_response(id: &str, name: &str, arguments: &str) -> ChatResponse {
    ChatResponse::with_tool_calls(vec![ToolCall::new(id, name, arguments)])
}
