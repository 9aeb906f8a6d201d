//! Outbound action type.

use serde::{Deserialize, Serialize};

use super::event::Event;

/// An outbound instruction produced by a handler and sent by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub conversation_id: String,
    pub content: String,
    /// Event id this action replies to, for threaded replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl Action {
    pub fn new(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            content: content.into(),
            reply_to: None,
        }
    }

    /// Reply in the event's conversation, threaded under the event.
    pub fn reply(event: &Event, content: impl Into<String>) -> Self {
        Self {
            conversation_id: event.conversation_id.clone(),
            content: content.into(),
            reply_to: Some(event.id.clone()),
        }
    }
}
