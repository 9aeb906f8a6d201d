//! In-memory store of per-conversation [`SessionState`], keyed by conversation id.
//!
//! Only the dispatch path reads or writes a given conversation's state, one event at a time,
//! so there is no per-key locking. The map itself sits behind a structural lock so the idle
//! eviction sweep can remove entries while dispatch inserts.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::SessionState;

type StateMap = HashMap<String, SessionState>;

#[derive(Debug, Clone, Default)]
pub struct SessionStateStore {
    states: Arc<RwLock<StateMap>>,
}

impl SessionStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the conversation's state, if one is stored. Never inserts.
    pub async fn get(&self, conversation_id: &str) -> Option<SessionState> {
        self.states.read().await.get(conversation_id).cloned()
    }

    /// Returns a copy of the conversation's state, creating an empty one on first use.
    pub async fn get_or_create(&self, conversation_id: &str) -> SessionState {
        if let Some(state) = self.states.read().await.get(conversation_id) {
            return state.clone();
        }

        let mut states = self.states.write().await;
        states
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                debug!(conversation_id = %conversation_id, "Creating session state");
                SessionState::new(conversation_id)
            })
            .clone()
    }

    /// Stores `state` under `conversation_id`, replacing any previous state for that id.
    pub async fn put(&self, conversation_id: &str, mut state: SessionState) {
        if state.conversation_id != conversation_id {
            state.conversation_id = conversation_id.to_string();
        }
        self.states
            .write()
            .await
            .insert(conversation_id.to_string(), state);
    }

    pub async fn remove(&self, conversation_id: &str) -> Option<SessionState> {
        self.states.write().await.remove(conversation_id)
    }

    /// Removes states idle for longer than `threshold`. Returns how many were removed.
    pub async fn evict_idle(&self, threshold: Duration) -> usize {
        self.evict_idle_at(Utc::now(), threshold).await
    }

    /// [`evict_idle`](Self::evict_idle) against an explicit clock.
    pub async fn evict_idle_at(&self, now: DateTime<Utc>, threshold: Duration) -> usize {
        let Ok(threshold) = chrono::Duration::from_std(threshold) else {
            return 0;
        };

        let mut states = self.states.write().await;
        let before = states.len();
        states.retain(|id, state| {
            let idle = state.is_idle(now, threshold);
            if idle {
                debug!(conversation_id = %id, last_updated = %state.last_updated, "Evicting idle session state");
            }
            !idle
        });
        before - states.len()
    }

    pub async fn contains(&self, conversation_id: &str) -> bool {
        self.states.read().await.contains_key(conversation_id)
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
