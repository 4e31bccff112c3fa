//! Tools the assistant can call.
//!
//! The set of tools is closed: every tool has a [`ToolName`] variant, and the
//! [`ToolRegistry`] maps each name to its executor. The registry's
//! declarations are sent verbatim as the `tools` array of each model request.

mod canvas;
mod web;

pub use canvas::GenerateContent;
pub use web::{extract_snippets, WebSearch, NO_RESULTS, SEARCH_ERROR};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::canvas_store::{Canvas, SharedCanvasStore, StoreError};
use crate::llm::{LlmClient, LlmError, ToolDefinition};

/// Identifier of a registered tool. Declaration order is the order tools are
/// declared to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolName {
    Search,
    GenerateContent,
}

impl ToolName {
    pub const ALL: [ToolName; 2] = [ToolName::Search, ToolName::GenerateContent];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Search => "search",
            ToolName::GenerateContent => "generate_content",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// Failure of a single tool execution. Its `Display` text is what the model
/// sees as the tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: ToolName, message: String },

    #[error("Content generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Content generation returned no content")]
    EmptyCompletion,

    #[error("Failed to save canvas: {0}")]
    Store(#[from] StoreError),
}

/// Per-request context handed to every tool.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Admin the request runs on behalf of
    pub owner_id: String,
    /// Model chosen for the conversation
    pub model: String,
}

/// Result of a successful tool execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    /// Text returned to the model
    pub content: String,
    /// Canvas created by this call, if any
    pub canvas: Option<Canvas>,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            canvas: None,
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> ToolName;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutput, ToolError>;
}

/// Decode a tool's typed arguments from the JSON object the model sent.
pub(crate) fn decode_args<T: DeserializeOwned>(tool: ToolName, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool,
        message: e.to_string(),
    })
}

/// Parse the raw `arguments` string of a tool call. Anything that is not a
/// JSON object becomes an empty object so the tool still runs.
pub fn parse_arguments(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) | Err(_) => {
            tracing::warn!("Tool arguments are not a JSON object, using {{}}: {}", raw);
            Value::Object(Default::default())
        }
    }
}

/// Static lookup table of tools, keyed by [`ToolName`].
pub struct ToolRegistry {
    tools: BTreeMap<ToolName, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Build a registry from explicit tools. A later tool with the same name
    /// replaces an earlier one.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let tools = tools.into_iter().map(|t| (t.name(), t)).collect();
        Self { tools }
    }

    /// The standard toolset: web search and canvas generation.
    pub fn standard(
        llm: Arc<dyn LlmClient>,
        canvases: SharedCanvasStore,
        search_url: &str,
    ) -> Result<Self, reqwest::Error> {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(WebSearch::new(search_url)?),
            Arc::new(GenerateContent::new(llm, canvases)),
        ];
        Ok(Self::new(tools))
    }

    pub fn names(&self) -> Vec<ToolName> {
        self.tools.keys().copied().collect()
    }

    pub fn list_tools(&self) -> Vec<(ToolName, &str)> {
        self.tools
            .iter()
            .map(|(name, tool)| (*name, tool.description()))
            .collect()
    }

    /// Declarations sent to the model, in registry order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| {
                ToolDefinition::function(
                    tool.name().as_str(),
                    tool.description(),
                    tool.parameters_schema(),
                )
            })
            .collect()
    }

    /// Execute the tool the model named.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let name: ToolName = name.parse()?;
        let tool = self
            .tools
            .get(&name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(args, ctx).await
    }
}
