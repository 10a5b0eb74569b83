//! OpenAI-compatible chat-completions provider with tool calling.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::info;

use tourdesk_core::{
    ChatMessage, ChatModel, ChatParams, ModelTurn, Role, ToolCall, ToolDefinition, Usage,
};

use crate::retry::retry_with_backoff;

/// A hung model service must not stall a turn forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        info!("Creating OpenAiProvider");
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn try_send(&self, request: &Value) -> anyhow::Result<ModelTurn> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        parse_model_turn(&response)
    }
}

#[async_trait]
impl ChatModel for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        params: &ChatParams,
    ) -> anyhow::Result<ModelTurn> {
        let request = build_request(messages, tools, params);

        info!("Sending chat completion request: model={}", params.model);
        let turn = retry_with_backoff(|| self.try_send(&request), &[2, 4, 8]).await?;
        info!(
            "Received model turn: {} tool call(s), {} reply chars",
            turn.tool_calls.len(),
            turn.content.len()
        );
        Ok(turn)
    }
}

/// Build the wire request. Tool definitions are attached only when
/// present, and parallel tool calls are disabled so the engine acts on
/// at most one request per step.
fn build_request(messages: &[ChatMessage], tools: &[ToolDefinition], params: &ChatParams) -> Value {
    let mut request = json!({
        "model": params.model,
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
        "messages": wire_messages(messages),
    });
    if !tools.is_empty() {
        request["tools"] = wire_tools(tools);
        request["tool_choice"] = json!("auto");
        request["parallel_tool_calls"] = json!(false);
    }
    request
}

fn wire_messages(messages: &[ChatMessage]) -> Value {
    Value::Array(messages.iter().map(wire_message).collect())
}

fn wire_message(message: &ChatMessage) -> Value {
    match message.role {
        Role::System => json!({"role": "system", "content": message.content}),
        Role::User => json!({"role": "user", "content": message.content}),
        Role::Assistant => {
            let content = if message.content.is_empty() && message.tool_calls.is_some() {
                Value::Null
            } else {
                Value::String(message.content.clone())
            };
            let mut wire = json!({"role": "assistant", "content": content});
            if let Some(calls) = &message.tool_calls {
                wire["tool_calls"] = Value::Array(
                    calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments.to_string(),
                                }
                            })
                        })
                        .collect(),
                );
            }
            wire
        }
        Role::Tool => json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id.as_deref().unwrap_or_default(),
            "content": message.content,
        }),
    }
}

fn wire_tools(tools: &[ToolDefinition]) -> Value {
    Value::Array(
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.input_schema,
                    }
                })
            })
            .collect(),
    )
}

/// Map a chat-completions response onto a [`ModelTurn`].
fn parse_model_turn(response: &Value) -> anyhow::Result<ModelTurn> {
    let message = &response["choices"][0]["message"];
    if !message.is_object() {
        anyhow::bail!("Invalid response format: missing message");
    }

    let content = message["content"].as_str().unwrap_or_default().to_string();
    let tool_calls = message["tool_calls"]
        .as_array()
        .map(|calls| calls.iter().filter_map(parse_tool_call).collect())
        .unwrap_or_default();

    let usage = response["usage"].as_object().map(|u| Usage {
        prompt_tokens: u32::try_from(u["prompt_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
        completion_tokens: u32::try_from(u["completion_tokens"].as_u64().unwrap_or(0))
            .unwrap_or(0),
        total_tokens: u32::try_from(u["total_tokens"].as_u64().unwrap_or(0)).unwrap_or(0),
    });

    Ok(ModelTurn {
        content,
        tool_calls,
        usage,
    })
}

fn parse_tool_call(value: &Value) -> Option<ToolCall> {
    let id = value["id"].as_str()?;
    let function = &value["function"];
    let name = function["name"].as_str()?;
    // Arguments arrive as a JSON-encoded string; malformed payloads
    // become null and fail schema validation downstream.
    let arguments = function["arguments"].as_str().map_or_else(
        || function["arguments"].clone(),
        |raw| serde_json::from_str(raw).unwrap_or(Value::Null),
    );
    Some(ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tourdesk_core::schema_object;

    fn definitions() -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: "search_packages".to_string(),
            description: "Search tour packages".to_string(),
            input_schema: schema_object(json!({"location": {"type": "string"}}), &[]),
        }]
    }

    #[test]
    fn request_disables_parallel_tool_calls() {
        let messages = vec![ChatMessage::user("hi")];
        let request = build_request(&messages, &definitions(), &ChatParams::default());

        assert_eq!(request["parallel_tool_calls"], json!(false));
        assert_eq!(request["tool_choice"], json!("auto"));
        assert_eq!(request["tools"][0]["function"]["name"], "search_packages");
    }

    #[test]
    fn request_without_tools_omits_tool_fields() {
        let messages = vec![ChatMessage::user("hi")];
        let request = build_request(&messages, &[], &ChatParams::default());

        assert!(request.get("tools").is_none());
        assert!(request.get("parallel_tool_calls").is_none());
    }

    #[test]
    fn tool_result_messages_carry_the_call_id() {
        let messages = vec![ChatMessage::tool_result("call_9", "{\"packages\":[]}")];
        let wire = wire_messages(&messages);

        assert_eq!(wire[0]["role"], "tool");
        assert_eq!(wire[0]["tool_call_id"], "call_9");
    }

    #[test]
    fn assistant_tool_request_round_trips_arguments_as_text() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "search_packages".to_string(),
            arguments: json!({"location": "Bali"}),
        };
        let messages = vec![ChatMessage::assistant_tool_call("", call)];
        let wire = wire_messages(&messages);

        assert!(wire[0]["content"].is_null());
        let raw = wire[0]["tool_calls"][0]["function"]["arguments"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed["location"], "Bali");
    }

    #[test]
    fn parses_a_plain_reply() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "Welcome!"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });

        let turn = parse_model_turn(&response).unwrap();

        assert_eq!(turn.content, "Welcome!");
        assert!(turn.tool_calls.is_empty());
        assert_eq!(turn.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn parses_a_tool_call_with_string_arguments() {
        let response = json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "search_hotels",
                        "arguments": "{\"city\":\"Dubai\",\"adults\":2}"
                    }
                }]
            }}]
        });

        let turn = parse_model_turn(&response).unwrap();

        assert!(turn.content.is_empty());
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].name, "search_hotels");
        assert_eq!(turn.tool_calls[0].arguments["city"], "Dubai");
        assert_eq!(turn.tool_calls[0].arguments["adults"], 2);
    }

    #[test]
    fn missing_message_is_an_error() {
        let response = json!({"error": {"message": "invalid key"}});
        assert!(parse_model_turn(&response).is_err());
    }
}
