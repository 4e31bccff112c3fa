//! OpenRouter chat-completion client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ChatMessage, ChatResponse, LlmClient, LlmError, ToolCall, ToolDefinition};

pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, LlmError> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

/// Pull `choices[0].message` out of a completion body.
fn parse_completion(body: Value) -> Result<ChatResponse, LlmError> {
    let body: CompletionBody =
        serde_json::from_value(body).map_err(|e| LlmError::Decode(e.to_string()))?;

    let message = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .ok_or(LlmError::MissingMessage)?;

    Ok(ChatResponse {
        content: message.content,
        tool_calls: message.tool_calls.unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
struct ImageBody {
    #[serde(default)]
    choices: Vec<ImageChoice>,
}

#[derive(Debug, Deserialize)]
struct ImageChoice {
    message: Option<ImageMessage>,
}

#[derive(Debug, Deserialize)]
struct ImageMessage {
    #[serde(default)]
    images: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    image_url: ImageUrl,
}

#[derive(Debug, Deserialize)]
struct ImageUrl {
    url: String,
}

/// URL (usually a data URL) of the first image in `choices[0].message.images`.
fn parse_image(body: Value) -> Result<Option<String>, LlmError> {
    let body: ImageBody =
        serde_json::from_value(body).map_err(|e| LlmError::Decode(e.to_string()))?;

    Ok(body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.images.into_iter().next())
        .map(|image| image.image_url.url))
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatResponse, LlmError> {
        let mut payload = json!({
            "model": model,
            "messages": messages,
        });
        if let Some(tools) = tools.filter(|t| !t.is_empty()) {
            payload["tools"] = json!(tools);
        }

        tracing::debug!(model, messages = messages.len(), "Sending chat completion");

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.send(self.client.post(&url).json(&payload)).await?;
        parse_completion(body)
    }

    async fn list_models(&self) -> Result<Value, LlmError> {
        let url = format!("{}/models", self.base_url);
        self.send(self.client.get(&url)).await
    }

    async fn generate_image(&self, model: &str, prompt: &str) -> Result<Option<String>, LlmError> {
        let payload = json!({
            "model": model,
            "messages": [ChatMessage::user(prompt)],
            "modalities": ["image", "text"],
        });

        tracing::debug!(model, "Requesting image generation");

        let url = format!("{}/chat/completions", self.base_url);
        let body = self.send(self.client.post(&url).json(&payload)).await?;
        parse_image(body)
    }
}
