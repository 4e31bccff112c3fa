//! Long-form content generation into a persisted canvas.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{decode_args, Tool, ToolContext, ToolError, ToolName, ToolOutput};
use crate::canvas_store::{NewCanvas, SharedCanvasStore};
use crate::llm::{ChatMessage, LlmClient};

const WRITER_INSTRUCTION: &str = "You are an expert writer for a teacher-training institute. \
Write complete, well-structured long-form content in Markdown for the request below. \
Respond with the content only, without preamble.";

pub struct GenerateContent {
    llm: Arc<dyn LlmClient>,
    canvases: SharedCanvasStore,
}

#[derive(Debug, Deserialize)]
struct GenerateArgs {
    #[serde(default)]
    prompt: String,
    /// Overrides the conversation's model for this generation.
    #[serde(default)]
    model: Option<String>,
}

impl GenerateContent {
    pub fn new(llm: Arc<dyn LlmClient>, canvases: SharedCanvasStore) -> Self {
        Self { llm, canvases }
    }
}

#[async_trait]
impl Tool for GenerateContent {
    fn name(&self) -> ToolName {
        ToolName::GenerateContent
    }

    fn description(&self) -> &str {
        "Generate long-form content (articles, course outlines, lesson plans, emails) and open it in the canvas side panel. Use this when the user asks you to write or draft something substantial."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "Detailed description of the content to write"
                },
                "model": {
                    "type": "string",
                    "description": "Optional model to write with (defaults to the current conversation model)"
                }
            },
            "required": ["prompt"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: GenerateArgs = decode_args(self.name(), args)?;
        let model = args
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(ctx.model.as_str());

        let messages = [
            ChatMessage::system(WRITER_INSTRUCTION),
            ChatMessage::user(args.prompt.as_str()),
        ];
        let response = self.llm.chat_completion(model, &messages, None).await?;

        let content = response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(ToolError::EmptyCompletion)?;

        let canvas = self
            .canvases
            .create_canvas(NewCanvas {
                content: &content,
                prompt: &args.prompt,
                owner_id: &ctx.owner_id,
            })
            .await?;

        tracing::info!(canvas_id = %canvas.id, model, "Generated canvas");

        Ok(ToolOutput {
            content: json!({ "id": canvas.id, "content": canvas.content }).to_string(),
            canvas: Some(canvas),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas_store::{CanvasStore, InMemoryCanvasStore};
    use crate::llm::{ChatResponse, LlmError};
    use crate::testing::ScriptedLlm;

    fn ctx() -> ToolContext {
        ToolContext {
            owner_id: "admin-1".to_string(),
            model: "openai/gpt-4o".to_string(),
        }
    }

    #[tokio::test]
    async fn persists_generated_content() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(ChatResponse::text("# Lesson plan"))]));
        let store = Arc::new(InMemoryCanvasStore::new());
        let tool = GenerateContent::new(llm.clone(), store.clone());

        let output = tool
            .execute(json!({"prompt": "Plan a lesson on fractions"}), &ctx())
            .await
            .unwrap();

        let canvas = output.canvas.expect("canvas created");
        assert_eq!(canvas.content, "# Lesson plan");
        assert_eq!(canvas.prompt, "Plan a lesson on fractions");
        assert_eq!(canvas.owner_id, "admin-1");

        let reported: Value = serde_json::from_str(&output.content).unwrap();
        assert_eq!(reported["id"], json!(canvas.id));
        assert_eq!(reported["content"], "# Lesson plan");

        let stored = store.get_canvas(canvas.id).await.unwrap();
        assert_eq!(stored, Some(canvas));

        let requests = llm.requests();
        assert_eq!(requests[0].model, "openai/gpt-4o");
        assert!(!requests[0].with_tools);
        assert!(requests[0].messages[0].is_system());
        assert_eq!(requests[0].messages[1], ChatMessage::user("Plan a lesson on fractions"));
    }

    #[tokio::test]
    async fn model_argument_overrides_conversation_model() {
        let llm = Arc::new(ScriptedLlm::new(vec![Ok(ChatResponse::text("text"))]));
        let tool = GenerateContent::new(llm.clone(), Arc::new(InMemoryCanvasStore::new()));

        tool.execute(
            json!({"prompt": "p", "model": "anthropic/claude-3.5-sonnet"}),
            &ctx(),
        )
        .await
        .unwrap();

        assert_eq!(llm.requests()[0].model, "anthropic/claude-3.5-sonnet");
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Ok(ChatResponse::text("   ")),
            Ok(ChatResponse::default()),
        ]));
        let store = Arc::new(InMemoryCanvasStore::new());
        let tool = GenerateContent::new(llm, store.clone());

        for _ in 0..2 {
            let err = tool.execute(json!({"prompt": "p"}), &ctx()).await.unwrap_err();
            assert!(matches!(err, ToolError::EmptyCompletion));
        }
        assert!(store.list_canvases("admin-1", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upstream_failure_is_an_error() {
        let llm = Arc::new(ScriptedLlm::new(vec![Err(LlmError::MissingMessage)]));
        let tool = GenerateContent::new(llm, Arc::new(InMemoryCanvasStore::new()));

        let err = tool.execute(json!({"prompt": "p"}), &ctx()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Content generation failed: LLM API response contained no message"
        );
    }

    #[tokio::test]
    async fn wrongly_typed_arguments_are_rejected() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let tool = GenerateContent::new(llm, Arc::new(InMemoryCanvasStore::new()));

        let err = tool.execute(json!({"prompt": 42}), &ctx()).await.unwrap_err();
        assert!(matches!(
            err,
            ToolError::InvalidArguments { tool: ToolName::GenerateContent, .. }
        ));
    }
}
