//! Core conversation loop.

use std::sync::Arc;

use anyhow::Context;

use crate::canvas_store::Canvas;
use crate::llm::{ChatMessage, LlmClient, ToolCall, ToolDefinition};
use crate::tools::{parse_arguments, ToolContext, ToolError, ToolOutput, ToolRegistry};

use super::prompt::build_system_prompt;

/// Maximum model round-trips per request.
pub const MAX_TURNS: usize = 5;

/// Reply used when the model is still calling tools after [`MAX_TURNS`].
pub const TURN_LIMIT_MESSAGE: &str = "I'm sorry, I couldn't complete your request within the allowed number of steps. Please try again with a more specific request.";

/// Final outcome of one conversation request.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    /// Assistant text shown in the chat
    pub response: String,
    /// Latest canvas generated during this request
    pub canvas: Option<Canvas>,
}

/// State carried from one turn to the next.
struct Conversation {
    messages: Vec<ChatMessage>,
    canvas: Option<Canvas>,
}

enum Turn {
    Continue(Conversation),
    Finished(AgentReply),
}

/// The admin assistant.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
}

impl Agent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry) -> Self {
        Self { llm, tools }
    }

    /// Run one request's conversation to completion.
    ///
    /// Only a failed model call is an error; tool failures are reported back
    /// to the model as tool results.
    pub async fn run_conversation(
        &self,
        history: Vec<ChatMessage>,
        model: &str,
        owner_id: &str,
    ) -> anyhow::Result<AgentReply> {
        let ctx = ToolContext {
            owner_id: owner_id.to_string(),
            model: model.to_string(),
        };
        let definitions = self.tools.definitions();

        let mut conversation = self.start(history);
        for turn in 1..=MAX_TURNS {
            tracing::debug!("Agent turn {}/{}", turn, MAX_TURNS);
            match self.run_turn(conversation, &definitions, &ctx).await? {
                Turn::Finished(reply) => return Ok(reply),
                Turn::Continue(next) => conversation = next,
            }
        }

        tracing::warn!("Turn budget of {} exhausted for {}", MAX_TURNS, owner_id);
        Ok(AgentReply {
            response: TURN_LIMIT_MESSAGE.to_string(),
            canvas: conversation.canvas,
        })
    }

    fn start(&self, history: Vec<ChatMessage>) -> Conversation {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if !history.first().is_some_and(ChatMessage::is_system) {
            messages.push(ChatMessage::system(build_system_prompt(&self.tools)));
        }
        messages.extend(history);

        Conversation {
            messages,
            canvas: None,
        }
    }

    async fn run_turn(
        &self,
        mut conversation: Conversation,
        definitions: &[ToolDefinition],
        ctx: &ToolContext,
    ) -> anyhow::Result<Turn> {
        let response = self
            .llm
            .chat_completion(&ctx.model, &conversation.messages, Some(definitions))
            .await
            .context("chat completion failed")?;

        if response.tool_calls.is_empty() {
            return Ok(Turn::Finished(AgentReply {
                response: response.content.unwrap_or_default(),
                canvas: conversation.canvas,
            }));
        }

        conversation.messages.push(ChatMessage::assistant(
            response.content,
            response.tool_calls.clone(),
        ));

        // Sequential on purpose: results must land in the order the model asked.
        for tool_call in &response.tool_calls {
            let result_str = match self.execute_tool_call(tool_call, ctx).await {
                Ok(output) => {
                    if output.canvas.is_some() {
                        conversation.canvas = output.canvas;
                    }
                    output.content
                }
                Err(e) => {
                    tracing::warn!("Tool {} failed: {}", tool_call.function.name, e);
                    format!("Error: {}", e)
                }
            };

            conversation
                .messages
                .push(ChatMessage::tool_result(tool_call.id.as_str(), result_str));
        }

        Ok(Turn::Continue(conversation))
    }

    /// Execute a single tool call.
    async fn execute_tool_call(
        &self,
        tool_call: &ToolCall,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        tracing::debug!(
            "Calling tool: {} with args: {}",
            tool_call.function.name,
            tool_call.function.arguments
        );
        let args = parse_arguments(&tool_call.function.arguments);
        self.tools.execute(&tool_call.function.name, args, ctx).await
    }
}
