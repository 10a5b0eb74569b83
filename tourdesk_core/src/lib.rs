#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod engine;
pub mod policy;
pub mod tools;

pub use engine::{DialogueEngine, EngineConfig, EngineError};
pub use tools::{Tool, ToolDefinition, ToolRegistry, ToolResult, schema_object};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// A request from the model to run one registered tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back on the result message
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Tool requests carried by an assistant message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Set on tool-result messages, pairing them with the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Assistant message that requests a tool invocation.
    #[must_use]
    pub fn assistant_tool_call(content: impl Into<String>, call: ToolCall) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Some(vec![call]),
            tool_call_id: None,
        }
    }

    /// Tool-result message answering the call with the given id.
    #[must_use]
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// One model response: a reply, a tool request, or both.
#[derive(Debug, Clone)]
pub struct ModelTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Sampling parameters for a model invocation.
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.1,
            max_tokens: 4096,
        }
    }
}

/// The seam to the externally hosted language model.
///
/// Implementations translate the message history plus tool definitions
/// into one provider request and map the response back into a
/// [`ModelTurn`]. Swapping providers must not touch engine logic.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        params: &ChatParams,
    ) -> anyhow::Result<ModelTurn>;
}

#[async_trait]
impl<T> ChatModel for Arc<T>
where
    T: ChatModel + ?Sized,
{
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        params: &ChatParams,
    ) -> anyhow::Result<ModelTurn> {
        (**self).complete(messages, tools, params).await
    }
}

/// Customer contact details collected by the presentation shell.
///
/// Identity is threaded through [`SessionContext`] into tool dispatch,
/// never through model-visible tool arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CustomerIdentity {
    /// Fill in fields newly provided by the shell without erasing
    /// values already known for the session.
    pub fn merge_from(&mut self, other: &Self) {
        if other.name.is_some() {
            self.name.clone_from(&other.name);
        }
        if other.email.is_some() {
            self.email.clone_from(&other.email);
        }
        if other.phone.is_some() {
            self.phone.clone_from(&other.phone);
        }
    }
}

/// Per-call session context bound into every tool dispatch.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub identity: CustomerIdentity,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_known_fields() {
        let mut identity = CustomerIdentity {
            name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            phone: None,
        };

        identity.merge_from(&CustomerIdentity {
            name: None,
            email: None,
            phone: Some("+91-98000-00000".to_string()),
        });

        assert_eq!(identity.name.as_deref(), Some("Asha Rao"));
        assert_eq!(identity.email.as_deref(), Some("asha@example.com"));
        assert_eq!(identity.phone.as_deref(), Some("+91-98000-00000"));
    }

    #[test]
    fn merge_overwrites_with_new_values() {
        let mut identity = CustomerIdentity {
            name: Some("A".to_string()),
            email: None,
            phone: None,
        };

        identity.merge_from(&CustomerIdentity {
            name: Some("B".to_string()),
            email: Some("b@example.com".to_string()),
            phone: None,
        });

        assert_eq!(identity.name.as_deref(), Some("B"));
        assert_eq!(identity.email.as_deref(), Some("b@example.com"));
    }

    #[test]
    fn tool_result_message_carries_call_id() {
        let msg = ChatMessage::tool_result("call_1", "{\"packages\":[]}");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn plain_messages_serialize_without_tool_fields() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(!json.contains("tool_calls"));
        assert!(!json.contains("tool_call_id"));
    }
}
