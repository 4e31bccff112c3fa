//! Chat-completion wire types.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One entry of a conversation, tagged by `role` on the wire.
///
/// Tool-call fields only exist on the variants that can carry them: an
/// assistant message may request tools, a tool message answers exactly one
/// of those requests by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        #[serde(default, deserialize_with = "null_as_empty")]
        content: String,
    },
    User {
        #[serde(default, deserialize_with = "null_as_empty")]
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        #[serde(default, deserialize_with = "null_as_empty")]
        content: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content,
            tool_calls,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }
}

/// First tool message that does not answer a call requested by an earlier
/// assistant message, by its `tool_call_id`.
pub fn find_orphan_tool_result(messages: &[ChatMessage]) -> Option<&str> {
    let mut requested = HashSet::new();
    for message in messages {
        match message {
            ChatMessage::Assistant { tool_calls, .. } => {
                requested.extend(tool_calls.iter().map(|call| call.id.as_str()));
            }
            ChatMessage::Tool { tool_call_id, .. } if !requested.contains(tool_call_id.as_str()) => {
                return Some(tool_call_id.as_str());
            }
            _ => {}
        }
    }
    None
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Name and raw JSON arguments of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// A tool declaration as sent in the `tools` array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: &'static str,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            tool_type: "function",
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

fn function_type() -> String {
    "function".to_string()
}

/// The top choice of a completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_results_must_answer_earlier_calls() {
        let answered = vec![
            ChatMessage::user("find X"),
            ChatMessage::assistant(None, vec![ToolCall::new("call_1", "search", "{}")]),
            ChatMessage::tool_result("call_1", "results"),
        ];
        assert_eq!(find_orphan_tool_result(&answered), None);

        let orphan = vec![ChatMessage::tool_result("ghost", "x")];
        assert_eq!(find_orphan_tool_result(&orphan), Some("ghost"));

        let answered_too_early = vec![
            ChatMessage::tool_result("call_1", "results"),
            ChatMessage::assistant(None, vec![ToolCall::new("call_1", "search", "{}")]),
        ];
        assert_eq!(find_orphan_tool_result(&answered_too_early), Some("call_1"));
    }

    #[test]
    fn assistant_without_tool_calls_omits_field() {
        let msg = ChatMessage::assistant(Some("hi".to_string()), Vec::new());
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "assistant", "content": "hi"})
        );
    }

    #[test]
    fn tool_message_serializes_call_id() {
        let msg = ChatMessage::tool_result("call_1", "done");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "tool", "tool_call_id": "call_1", "content": "done"})
        );
    }

    #[test]
    fn client_history_deserializes_by_role() {
        let history: Vec<ChatMessage> = serde_json::from_value(json!([
            {"role": "system", "content": "be brief"},
            {"role": "user", "content": null},
            {"role": "assistant", "content": null, "tool_calls": [
                {"id": "c1", "type": "function", "function": {"name": "search", "arguments": "{}"}}
            ]},
            {"role": "tool", "tool_call_id": "c1", "content": "No results found."}
        ]))
        .unwrap();

        assert!(history[0].is_system());
        assert_eq!(history[1], ChatMessage::user(""));
        match &history[2] {
            ChatMessage::Assistant { tool_calls, .. } => {
                assert_eq!(tool_calls[0].function.name, "search")
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_value::<ChatMessage>(json!({"role": "robot", "content": "x"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn tool_definition_has_function_shape() {
        let def = ToolDefinition::function("search", "Search", json!({"type": "object"}));
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            json!({
                "type": "function",
                "function": {"name": "search", "description": "Search", "parameters": {"type": "object"}}
            })
        );
    }
}
