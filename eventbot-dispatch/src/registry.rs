//! Handler registry: command name or event type → handler.

use std::collections::HashMap;
use std::sync::Arc;

use eventbot_core::{BotError, Handler, Result};
use tracing::debug;

/// Startup-time mapping from route key to handler. Keys are case-insensitive; a leading `/` is ignored.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

fn normalize_key(key: &str) -> String {
    key.trim().trim_start_matches('/').to_lowercase()
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `key`. Fails with a config error on an empty or duplicate key.
    pub fn register(&mut self, key: &str, handler: Arc<dyn Handler>) -> Result<()> {
        let key = normalize_key(key);
        if key.is_empty() {
            return Err(BotError::Config("handler key must not be empty".to_string()));
        }
        if self.handlers.contains_key(&key) {
            return Err(BotError::Config(format!(
                "duplicate handler registration for '{}'",
                key
            )));
        }
        debug!(
            key = %key,
            handler = %std::any::type_name_of_val(handler.as_ref()),
            "Registered handler"
        );
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_handler(mut self, key: &str, handler: Arc<dyn Handler>) -> Result<Self> {
        self.register(key, handler)?;
        Ok(self)
    }

    pub fn lookup(&self, key: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(&normalize_key(key)).cloned()
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.handlers.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
