//! The dialogue engine: a bounded loop of model-invoke / tool-dispatch
//! steps driving one external turn of conversation.

use thiserror::Error;
use tracing::{info, warn};

use crate::tools::ToolRegistry;
use crate::{ChatMessage, ChatModel, ChatParams, SessionContext, ToolCall, policy};

/// Engine configuration: sampling parameters plus the policy text
/// composed with the history on every model invocation.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub params: ChatParams,
    pub policy: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            params: ChatParams::default(),
            policy: policy::FRONT_DESK_POLICY.to_string(),
        }
    }
}

/// Fatal turn-level failures. Tool failures never appear here - they
/// become tool-result messages the model reacts to.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("empty user message")]
    EmptyUserMessage,

    #[error("model returned an empty reply")]
    EmptyReply,

    #[error("model invocation failed: {0}")]
    Model(#[source] anyhow::Error),
}

/// Per-turn state machine.
enum TurnState {
    AwaitingModel,
    ToolRequested(ToolCall),
    ReplyReady(String),
}

/// Drives one logical conversation turn by turn.
///
/// Each call to [`DialogueEngine::advance`] appends the user message,
/// then cycles `AwaitingModel -> ToolRequested -> AwaitingModel` until
/// the model answers without requesting a tool (`ReplyReady`). The
/// number of tool round-trips within a turn is bounded only by the
/// model deciding to stop; history is never truncated within a turn.
pub struct DialogueEngine<M = std::sync::Arc<dyn ChatModel>>
where
    M: Send + Sync,
{
    model: M,
    registry: ToolRegistry,
    config: EngineConfig,
}

impl<M> DialogueEngine<M>
where
    M: ChatModel + Send + Sync,
{
    pub const fn new(model: M, registry: ToolRegistry, config: EngineConfig) -> Self {
        Self {
            model,
            registry,
            config,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one external turn: one user message in, one assistant reply
    /// out, with any number of internal tool round-trips in between.
    ///
    /// On success `history` has gained the user message, any tool
    /// request/result pairs, and the final assistant reply. On
    /// [`EngineError`] the in-memory history keeps whatever was
    /// appended before the failure; callers decide whether to persist
    /// it (the conversation manager does not).
    pub async fn advance(
        &self,
        ctx: &SessionContext,
        history: &mut Vec<ChatMessage>,
        user_text: &str,
    ) -> Result<String, EngineError> {
        let text = user_text.trim();
        if text.is_empty() {
            return Err(EngineError::EmptyUserMessage);
        }

        history.push(ChatMessage::user(text));
        let definitions = self.registry.definitions();
        let mut state = TurnState::AwaitingModel;

        loop {
            state = match state {
                TurnState::AwaitingModel => {
                    let messages = self.compose(history);
                    let turn = self
                        .model
                        .complete(&messages, &definitions, &self.config.params)
                        .await
                        .map_err(EngineError::Model)?;

                    let mut calls = turn.tool_calls.into_iter();
                    if let Some(call) = calls.next() {
                        // At most one tool call is acted on per model step.
                        let dropped = calls.count();
                        if dropped > 0 {
                            warn!(
                                "Model requested {dropped} extra tool call(s) in one step; \
                                 acting on '{}' only",
                                call.name
                            );
                        }
                        history.push(ChatMessage::assistant_tool_call(turn.content, call.clone()));
                        TurnState::ToolRequested(call)
                    } else {
                        TurnState::ReplyReady(turn.content)
                    }
                }
                TurnState::ToolRequested(call) => {
                    info!(
                        "Dispatching tool '{}' for session {}",
                        call.name, ctx.session_id
                    );
                    let result = self
                        .registry
                        .dispatch(&call.name, call.arguments.clone(), ctx)
                        .await;
                    if result.is_error {
                        warn!(
                            "Tool '{}' failed ({}): {}",
                            call.name,
                            result.error_type.as_deref().unwrap_or("tool_error"),
                            result.content
                        );
                    }
                    history.push(ChatMessage::tool_result(&call.id, result.content));
                    TurnState::AwaitingModel
                }
                TurnState::ReplyReady(reply) => {
                    let reply = reply.trim().to_string();
                    if reply.is_empty() {
                        return Err(EngineError::EmptyReply);
                    }
                    history.push(ChatMessage::assistant(reply.clone()));
                    return Ok(reply);
                }
            };
        }
    }

    /// Policy system message plus the full running history.
    fn compose(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(self.config.policy.clone()));
        messages.extend_from_slice(history);
        messages
    }
}
