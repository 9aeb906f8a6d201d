//! Inbound event type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded unit of inbound activity. Created by the transport, consumed once by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub conversation_id: String,
    /// Author of the event; used to drop the bot's own activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub payload: Value,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Creates an event stamped with the current time and no sender.
    pub fn new(
        id: impl Into<String>,
        event_type: impl Into<String>,
        conversation_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            id: id.into(),
            event_type: event_type.into(),
            conversation_id: conversation_id.into(),
            sender_id: None,
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// The `text` field of the payload, if any.
    pub fn text(&self) -> Option<&str> {
        self.payload.get("text").and_then(Value::as_str)
    }

    /// Command name when the text starts with `/name` (lowercased, `@botname` suffix stripped).
    pub fn command(&self) -> Option<String> {
        let first = self.text()?.split_whitespace().next()?;
        let name = first.strip_prefix('/')?.split('@').next()?;
        if name.is_empty() {
            return None;
        }
        Some(name.to_lowercase())
    }

    /// Text following the command word, trimmed. Whole text when there is no command.
    pub fn command_args(&self) -> Option<&str> {
        let text = self.text()?.trim();
        if self.command().is_none() {
            return Some(text);
        }
        Some(
            text.split_once(char::is_whitespace)
                .map(|(_, rest)| rest.trim())
                .unwrap_or(""),
        )
    }

    /// True when the text contains `@username` as a word (case-insensitive, trailing
    /// punctuation ignored). A leading `@` on `username` is accepted.
    pub fn mentions(&self, username: &str) -> bool {
        let username = username.trim_start_matches('@');
        if username.is_empty() {
            return false;
        }
        let Some(text) = self.text() else {
            return false;
        };
        text.split_whitespace().any(|word| {
            word.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_')
                .strip_prefix('@')
                .is_some_and(|name| name.eq_ignore_ascii_case(username))
        })
    }

    pub fn is_from(&self, sender_id: &str) -> bool {
        self.sender_id.as_deref() == Some(sender_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_event(text: &str) -> Event {
        Event::new("e1", "message", "c1", json!({ "text": text }))
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(text_event("/echo hi").command(), Some("echo".to_string()));
        assert_eq!(text_event("  /Help").command(), Some("help".to_string()));
        assert_eq!(text_event("/echo@my_bot hi").command(), Some("echo".to_string()));
        assert_eq!(text_event("hello /echo").command(), None);
        assert_eq!(text_event("/").command(), None);
        assert_eq!(text_event("").command(), None);
    }

    #[test]
    fn test_command_args() {
        assert_eq!(text_event("/echo  hello world ").command_args(), Some("hello world"));
        assert_eq!(text_event("/echo").command_args(), Some(""));
        assert_eq!(text_event(" plain text ").command_args(), Some("plain text"));
        let no_text = Event::new("e1", "reaction", "c1", json!({ "emoji": "+1" }));
        assert_eq!(no_text.command_args(), None);
    }

    #[test]
    fn test_mentions() {
        assert!(text_event("@eventbot hi").mentions("eventbot"));
        assert!(text_event("hey @EventBot, ping").mentions("@eventbot"));
        assert!(text_event("thanks @eventbot!").mentions("eventbot"));
        assert!(!text_event("@eventbot_two hi").mentions("eventbot"));
        assert!(!text_event("eventbot hi").mentions("eventbot"));
        assert!(!text_event("mail me@eventbot").mentions("eventbot"));
        assert!(!text_event("@ hi").mentions(""));
        let no_text = Event::new("e1", "join", "c1", json!({}));
        assert!(!no_text.mentions("eventbot"));
    }

    #[test]
    fn test_deserialize_wire_event() {
        let event: Event = serde_json::from_value(json!({
            "id": "42",
            "type": "message",
            "conversation_id": "room-1",
            "sender_id": "u7",
            "payload": { "text": "hi" },
            "timestamp": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(event.event_type, "message");
        assert!(event.is_from("u7"));
        assert_eq!(event.text(), Some("hi"));
    }

    #[test]
    fn test_deserialize_defaults_optional_fields() {
        let event: Event = serde_json::from_value(json!({
            "id": "1",
            "type": "join",
            "conversation_id": "room-1"
        }))
        .unwrap();

        assert!(event.sender_id.is_none());
        assert!(event.payload.is_null());
    }
}
