//! Handler trait and its outcome.

use async_trait::async_trait;

use super::{action::Action, event::Event, session::SessionState};
use crate::error::HandlerError;

/// What a handler produced for one event: outbound actions and the updated conversation state.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub actions: Vec<Action>,
    pub state: SessionState,
}

impl HandlerOutcome {
    /// No actions; state passed through.
    pub fn new(state: SessionState) -> Self {
        Self {
            actions: Vec::new(),
            state,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

/// Maps an event and the conversation's current state to actions and an updated state.
/// Registered once at startup; implementations keep no per-conversation state of their own.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        event: &Event,
        state: SessionState,
    ) -> Result<HandlerOutcome, HandlerError>;
}
