//! One conversation's full state.

use chrono::{DateTime, Utc};
use tourdesk_core::{ChatMessage, CustomerIdentity, Role};

/// Complete state of a conversation: ordered message history plus the
/// customer identity collected so far. Trip context (chosen package,
/// dates, hotels) lives inside the messages themselves.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Session/thread identifier supplied by the presentation shell
    pub id: String,
    pub identity: CustomerIdentity,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    #[must_use]
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            identity: CustomerIdentity::default(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub const fn message_count(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the most recent assistant reply, if any.
    #[must_use]
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && m.tool_calls.is_none())
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourdesk_core::ToolCall;

    #[test]
    fn new_session_is_empty() {
        let session = ConversationSession::new("s-1".to_string());
        assert!(session.is_empty());
        assert_eq!(session.message_count(), 0);
        assert!(session.last_reply().is_none());
    }

    #[test]
    fn last_reply_skips_tool_request_messages() {
        let mut session = ConversationSession::new("s-1".to_string());
        session.messages.push(ChatMessage::user("hi"));
        session.messages.push(ChatMessage::assistant("Welcome!"));
        session.messages.push(ChatMessage::user("find packages"));
        session.messages.push(ChatMessage::assistant_tool_call(
            "",
            ToolCall {
                id: "c1".to_string(),
                name: "search_packages".to_string(),
                arguments: serde_json::json!({}),
            },
        ));

        assert_eq!(session.last_reply(), Some("Welcome!"));
    }
}
