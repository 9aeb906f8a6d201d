//! Transport abstraction for receiving events and sending actions.
//!
//! [`Transport`] is the sole adapter boundary to the external service; the application
//! crate ships an HTTP long-poll implementation and tests substitute scripted ones.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Action, Event, Session};

/// Owns the single live connection to the external service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the auth handshake and replaces any previous session.
    /// `Auth` on rejected credentials, `Network` on transport failure.
    async fn connect(&mut self) -> Result<Session>;

    /// Waits for the next inbound event. `ConnectionLost` when the connection drops.
    async fn receive(&mut self) -> Result<Event>;

    /// Sends one action. `Network` on transport failure, `Rejected` when the service refuses it.
    async fn send(&self, action: &Action) -> Result<()>;

    /// Drops the live session.
    async fn close(&mut self);
}
