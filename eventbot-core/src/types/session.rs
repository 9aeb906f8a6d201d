//! Per-conversation state and the live transport session.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mutable per-conversation context retained across events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub conversation_id: String,
    pub data: HashMap<String, Value>,
    pub last_updated: DateTime<Utc>,
}

impl SessionState {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            data: HashMap::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Returns true if the state was last updated before `now - threshold`.
    pub fn is_idle(&self, now: DateTime<Utc>, threshold: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_updated) > threshold
    }
}

/// Authenticated connection identity returned by the transport handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The bot's own account id; events from it are not dispatched.
    pub self_id: String,
    pub username: Option<String>,
    pub connected_at: DateTime<Utc>,
}

impl Session {
    pub fn new(self_id: impl Into<String>, username: Option<String>) -> Self {
        Self {
            self_id: self_id.into(),
            username,
            connected_at: Utc::now(),
        }
    }
}
