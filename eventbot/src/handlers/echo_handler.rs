//! Echo handler: replies with the event's payload and counts echoes per conversation.

use async_trait::async_trait;
use eventbot_core::{Action, Event, Handler, HandlerError, HandlerOutcome, SessionState};
use serde_json::Value;
use tracing::{info, instrument};

/// State key holding how many times this conversation has been echoed.
pub const ECHO_COUNT_KEY: &str = "echo_count";

/// Mirrors the event back to its conversation. For `/echo text` the reply is `text`; for
/// other events it is the whole payload text (other commands included), or the payload JSON
/// when there is no text.
#[derive(Clone, Default)]
pub struct EchoHandler;

impl EchoHandler {
    pub fn new() -> Self {
        Self
    }
}

fn echo_content(event: &Event) -> Option<String> {
    if event.command().as_deref() == Some("echo") {
        return event
            .command_args()
            .filter(|args| !args.is_empty())
            .map(str::to_string);
    }
    if let Some(text) = event.text().map(str::trim) {
        return (!text.is_empty()).then(|| text.to_string());
    }
    match &event.payload {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl Handler for EchoHandler {
    #[instrument(skip(self, event, state), fields(conversation_id = %event.conversation_id))]
    async fn handle(
        &self,
        event: &Event,
        mut state: SessionState,
    ) -> Result<HandlerOutcome, HandlerError> {
        let content = echo_content(event)
            .ok_or_else(|| HandlerError::MissingPayload(format!("event {} has nothing to echo", event.id)))?;

        let count = state
            .get(ECHO_COUNT_KEY)
            .and_then(Value::as_u64)
            .unwrap_or(0)
            + 1;
        state.set(ECHO_COUNT_KEY, count);

        info!(event_id = %event.id, count, "Echoing event");
        Ok(HandlerOutcome::new(state).with_action(Action::reply(event, content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state() -> SessionState {
        SessionState::new("c1")
    }

    #[tokio::test]
    async fn test_echo_command_args() {
        let event = Event::new("e1", "message", "c1", json!({ "text": "/echo hello there" }));

        let outcome = EchoHandler::new().handle(&event, state()).await.unwrap();

        assert_eq!(outcome.actions, vec![Action::reply(&event, "hello there")]);
        assert_eq!(outcome.state.get(ECHO_COUNT_KEY), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_echo_plain_text_and_raw_payload() {
        let text = Event::new("e1", "echo", "c1", json!({ "text": "hi" }));
        let raw = Event::new("e2", "echo", "c1", json!({ "n": 3 }));
        let string = Event::new("e3", "echo", "c1", json!("plain"));

        let handler = EchoHandler::new();
        let a = handler.handle(&text, state()).await.unwrap();
        let b = handler.handle(&raw, state()).await.unwrap();
        let c = handler.handle(&string, state()).await.unwrap();

        assert_eq!(a.actions[0].content, "hi");
        assert_eq!(b.actions[0].content, r#"{"n":3}"#);
        assert_eq!(c.actions[0].content, "plain");
    }

    #[tokio::test]
    async fn test_other_commands_echo_whole_text() {
        let event = Event::new("e1", "echo", "c1", json!({ "text": " /unknown foo " }));

        let outcome = EchoHandler::new().handle(&event, state()).await.unwrap();

        assert_eq!(outcome.actions[0].content, "/unknown foo");
    }

    #[tokio::test]
    async fn test_echo_count_accumulates() {
        let event = Event::new("e1", "echo", "c1", json!({ "text": "again" }));
        let handler = EchoHandler::new();

        let first = handler.handle(&event, state()).await.unwrap();
        let second = handler.handle(&event, first.state).await.unwrap();

        assert_eq!(second.state.get(ECHO_COUNT_KEY), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_empty_input_is_missing_payload() {
        let handler = EchoHandler::new();
        for payload in [json!(null), json!({}), json!({ "text": "/echo" }), json!({ "text": "  " })] {
            let event = Event::new("e1", "echo", "c1", payload.clone());
            let result = handler.handle(&event, state()).await;
            assert!(
                matches!(result, Err(HandlerError::MissingPayload(_))),
                "payload {}",
                payload
            );
        }
    }
}
