//! The conversational entry point exposed to the presentation shell.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tourdesk_core::{ChatMessage, ChatModel, CustomerIdentity, DialogueEngine, EngineError,
    SessionContext};
use tracing::{debug, info};

use crate::checkpoint::CheckpointStore;
use crate::session::ConversationSession;

/// Errors surfaced to the presentation layer for one submitted turn.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Fatal engine failure; the stored history is untouched and the
    /// turn can be retried.
    #[error("conversation engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("checkpoint store error: {0}")]
    Checkpoint(String),
}

/// Serializes one conversation's turns over the engine and the
/// checkpoint store.
///
/// The caller guarantees at most one in-flight `submit` per session id
/// at a time (the shell serializes input); distinct sessions are
/// independent because all per-session state travels through the
/// loaded checkpoint and the per-call [`SessionContext`].
pub struct ConversationManager<M = Arc<dyn ChatModel>>
where
    M: Send + Sync,
{
    engine: DialogueEngine<M>,
    store: Arc<dyn CheckpointStore>,
}

impl<M> ConversationManager<M>
where
    M: ChatModel + Send + Sync,
{
    pub const fn new(engine: DialogueEngine<M>, store: Arc<dyn CheckpointStore>) -> Self {
        Self { engine, store }
    }

    /// Run one external turn for the session and return the updated
    /// message list.
    ///
    /// Newly provided identity fields are merged into the session
    /// before the turn so the booking tool sees them; absent fields
    /// never erase what the session already knows. On engine failure
    /// nothing is saved: the stored history stays at the last
    /// completed turn.
    pub async fn submit(
        &self,
        session_id: &str,
        user_text: &str,
        identity: &CustomerIdentity,
    ) -> Result<Vec<ChatMessage>, SubmitError> {
        let mut session = self
            .store
            .load(session_id)
            .await
            .map_err(|e| SubmitError::Checkpoint(e.to_string()))?
            .unwrap_or_else(|| {
                info!("Starting new session: {session_id}");
                ConversationSession::new(session_id.to_string())
            });

        session.identity.merge_from(identity);

        let ctx = SessionContext {
            session_id: session.id.clone(),
            identity: session.identity.clone(),
        };

        let reply = self
            .engine
            .advance(&ctx, &mut session.messages, user_text)
            .await?;

        session.updated_at = Utc::now();
        self.store
            .save(&session)
            .await
            .map_err(|e| SubmitError::Checkpoint(e.to_string()))?;

        debug!(
            "Turn completed for session {} ({} messages, reply {} chars)",
            session.id,
            session.messages.len(),
            reply.len()
        );

        Ok(session.messages)
    }
}
