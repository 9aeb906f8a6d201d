//! Reconnect supervisor: wraps a [`Transport`] with bounded, jittered exponential backoff.
//!
//! `Network` and `ConnectionLost` are retried; `Auth` and every other error pass straight
//! through. The failure counter tracks consecutive failures without progress. It resets when an
//! event is received, or when a lost connection had stayed up for at least the policy's
//! `max_delay`. A connection that authenticates and then drops immediately still exhausts the
//! budget.

mod backoff;

pub use backoff::{apply_jitter, RetryPolicy};

use eventbot_core::{BotError, Event, Result, Session, Transport};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::service::{ServiceState, StateTracker};

pub struct ReconnectSupervisor<T> {
    transport: T,
    policy: RetryPolicy,
    state: StateTracker,
    session: Option<Session>,
    /// When the current connection was established.
    connected_at: Option<Instant>,
    failures: u32,
}

impl<T: Transport> ReconnectSupervisor<T> {
    pub fn new(transport: T, policy: RetryPolicy, state: StateTracker) -> Self {
        Self {
            transport,
            policy,
            state,
            session: None,
            connected_at: None,
            failures: 0,
        }
    }

    /// The live session, if connected.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Connects, retrying transient failures with backoff until the budget is spent.
    pub async fn connect(&mut self) -> Result<Session> {
        loop {
            match self.transport.connect().await {
                Ok(session) => {
                    info!(
                        self_id = %session.self_id,
                        username = ?session.username,
                        "Connected to service"
                    );
                    self.session = Some(session.clone());
                    self.connected_at = Some(Instant::now());
                    return Ok(session);
                }
                Err(e) if e.is_retriable() => self.back_off(e).await?,
                Err(e) => {
                    error!(error = %e, "Connect failed with non-retriable error");
                    self.session = None;
                    self.connected_at = None;
                    return Err(e);
                }
            }
        }
    }

    /// Next event; transparently reconnects after `ConnectionLost`/`Network`.
    pub async fn receive(&mut self) -> Result<Event> {
        loop {
            match self.transport.receive().await {
                Ok(event) => {
                    if self.failures > 0 {
                        debug!(failures = self.failures, "Receive recovered, resetting failure count");
                        self.failures = 0;
                    }
                    return Ok(event);
                }
                Err(e) if e.is_retriable() => {
                    warn!(error = %e, "Connection lost, reconnecting");
                    let uptime = self.connected_at.take().map(|at| at.elapsed());
                    if self.failures > 0 && uptime.is_some_and(|up| up >= self.policy.max_delay) {
                        debug!(
                            failures = self.failures,
                            uptime_ms = uptime.map(|up| up.as_millis() as u64),
                            "Connection was healthy, resetting failure count"
                        );
                        self.failures = 0;
                    }
                    self.session = None;
                    self.state.transition(ServiceState::Degraded);
                    self.back_off(e).await?;
                    self.connect().await?;
                    self.state.transition(ServiceState::Running);
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn close(&mut self) {
        self.transport.close().await;
        self.session = None;
        self.connected_at = None;
    }

    /// Counts a failure and sleeps, or escalates once the retry budget is spent.
    async fn back_off(&mut self, error: BotError) -> Result<()> {
        self.failures += 1;
        if self.failures > self.policy.max_retries {
            error!(
                attempts = self.failures,
                max_retries = self.policy.max_retries,
                error = %error,
                "Retry budget exhausted"
            );
            return Err(BotError::ServiceUnavailable {
                attempts: self.failures,
                last_error: error.to_string(),
            });
        }

        let delay = self.policy.delay_for_attempt(self.failures - 1);
        warn!(
            attempt = self.failures,
            max_retries = self.policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Transient transport failure, backing off"
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }
}
