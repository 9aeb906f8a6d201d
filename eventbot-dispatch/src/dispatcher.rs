//! Event dispatcher: routes each event to its handler and contains handler failures.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use eventbot_core::{Action, Event, Handler, HandlerError, SessionState, SessionStateStore};
use futures::FutureExt;
use tracing::{debug, error, info, instrument};

use crate::registry::HandlerRegistry;

/// Route tried for events that mention the bot by username.
pub const MENTION_ROUTE: &str = "mention";

/// Routes events by command name, then mention, then event type. Owns the registry (frozen after startup)
/// and a handle to the session store.
pub struct EventDispatcher {
    registry: HandlerRegistry,
    store: SessionStateStore,
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl EventDispatcher {
    pub fn new(registry: HandlerRegistry, store: SessionStateStore) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn store(&self) -> &SessionStateStore {
        &self.store
    }

    /// Route key and handler for `event`: its command if one is registered, else
    /// [`MENTION_ROUTE`] when the text mentions `mention_name`, else its type.
    pub fn resolve(
        &self,
        event: &Event,
        mention_name: Option<&str>,
    ) -> Option<(String, Arc<dyn Handler>)> {
        if let Some(command) = event.command() {
            if let Some(handler) = self.registry.lookup(&command) {
                return Some((command, handler));
            }
        }
        if mention_name.is_some_and(|name| event.mentions(name)) {
            if let Some(handler) = self.registry.lookup(MENTION_ROUTE) {
                return Some((MENTION_ROUTE.to_string(), handler));
            }
        }
        self.registry
            .lookup(&event.event_type)
            .map(|handler| (event.event_type.clone(), handler))
    }

    /// [`dispatch_as`](Self::dispatch_as) without a bot username, so the mention route is
    /// never taken.
    pub async fn dispatch(&self, event: Event) -> Vec<Action> {
        self.dispatch_as(event, None).await
    }

    /// Runs the handler for `event` against its conversation state and returns the actions to send.
    ///
    /// `mention_name` is the bot's username for mention routing. Never fails: unknown routes,
    /// handler errors, and handler panics all yield no actions and leave the store untouched;
    /// state is only written after the handler succeeds.
    #[instrument(
        skip(self, event, mention_name),
        fields(
            event_id = %event.id,
            event_type = %event.event_type,
            conversation_id = %event.conversation_id
        )
    )]
    pub async fn dispatch_as(&self, event: Event, mention_name: Option<&str>) -> Vec<Action> {
        let Some((route, handler)) = self.resolve(&event, mention_name) else {
            debug!("No handler registered, dropping event");
            return Vec::new();
        };

        let state = self
            .store
            .get(&event.conversation_id)
            .await
            .unwrap_or_else(|| SessionState::new(&event.conversation_id));
        let result = AssertUnwindSafe(handler.handle(&event, state))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(panic.as_ref()))));

        match result {
            Ok(outcome) => {
                let mut state = outcome.state;
                state.last_updated = Utc::now();
                self.store.put(&event.conversation_id, state).await;
                info!(
                    route = %route,
                    actions = outcome.actions.len(),
                    "Event dispatched"
                );
                outcome.actions
            }
            Err(e) => {
                error!(route = %route, error = %e, "Handler failed, event dropped");
                Vec::new()
            }
        }
    }
}
