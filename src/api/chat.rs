//! Assistant chat endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde_json::{json, Value};

use super::auth::AuthUser;
use super::error::ApiError;
use super::routes::AppState;
use super::types::{ChatReply, ChatRequest, ImageReply, ImageRequest};
use crate::llm::find_orphan_tool_result;

const MISSING_FIELDS: &str = "Missing messages or model";

/// `POST /api/admin/ai-agent-chat`
pub async fn agent_chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected chat body: {}", e);
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    let (messages, model) = match (request.messages, request.model) {
        (Some(messages), Some(model)) if !model.trim().is_empty() => (messages, model),
        _ => return Err(ApiError::BadRequest(MISSING_FIELDS.to_string())),
    };

    if let Some(id) = find_orphan_tool_result(&messages) {
        return Err(ApiError::BadRequest(format!(
            "Tool message {} does not answer an earlier tool call",
            id
        )));
    }

    tracing::info!(
        user = %user.id,
        model = %model,
        messages = messages.len(),
        "Assistant chat request"
    );

    let reply = state
        .agent
        .run_conversation(messages, &model, &user.id)
        .await
        .map_err(|e| {
            tracing::error!("Error calling OpenRouter API: {:#}", e);
            ApiError::Internal("Error calling OpenRouter API".to_string())
        })?;

    let (canvas_content, canvas_id) = match reply.canvas {
        Some(canvas) => (Some(canvas.content), Some(canvas.id)),
        None => (None, None),
    };

    Ok(Json(ChatReply {
        response: reply.response,
        canvas_content,
        canvas_id,
    }))
}

/// `GET /api/admin/ai-agent-chat/models`
pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let models = state.llm.list_models().await.map_err(|e| {
        tracing::error!("Error fetching OpenRouter models: {}", e);
        ApiError::Internal("Error fetching OpenRouter models".to_string())
    })?;
    Ok(Json(json!({ "models": models })))
}

/// `POST /api/admin/ai-agent-chat/image`
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<ImageReply>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected image body: {}", e);
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    let (prompt, model) = match (request.prompt, request.model) {
        (Some(prompt), Some(model)) if !prompt.trim().is_empty() && !model.trim().is_empty() => {
            (prompt, model)
        }
        _ => return Err(ApiError::BadRequest("Missing prompt or model".to_string())),
    };

    tracing::info!(user = %user.id, model = %model, "Image generation request");

    let image_url = state
        .llm
        .generate_image(&model, &prompt)
        .await
        .map_err(|e| {
            tracing::error!("Error calling OpenRouter image generation API: {}", e);
            ApiError::Internal("Error calling OpenRouter image generation API".to_string())
        })?
        .ok_or_else(|| {
            tracing::warn!(model = %model, "Image generation returned no image");
            ApiError::Internal("Image generation failed".to_string())
        })?;

    Ok(Json(ImageReply { image_url }))
}
