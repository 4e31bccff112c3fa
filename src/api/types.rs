//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canvas_store::Canvas;
use crate::llm::ChatMessage;

/// Request to run one assistant conversation turn.
///
/// Both fields are optional here so that a missing field becomes a 400 with
/// a readable message instead of a decoder rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    /// Full chat history as kept by the client
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,

    /// OpenRouter model identifier
    #[serde(default)]
    pub model: Option<String>,
}

/// Reply to a conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    /// Assistant text
    pub response: String,

    /// Content of the canvas generated during this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_content: Option<String>,

    /// Id of the canvas generated during this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_id: Option<Uuid>,
}

/// Request to generate one image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub model: Option<String>,
}

/// Generated image location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReply {
    pub image_url: String,
}

/// Canvases of the calling admin.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasList {
    pub canvases: Vec<Canvas>,
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
