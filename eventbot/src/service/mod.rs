//! BotService: owns the supervisor, dispatcher, and sweeper, and drives the event loop.

mod eviction;
mod state;

pub use eviction::EvictionSweeper;
pub use state::{ServiceState, StateTracker};

use std::time::Duration;

use eventbot_core::{Action, BotError, Event, SessionStateStore, Transport};
use eventbot_dispatch::{EventDispatcher, HandlerRegistry};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::BotConfig;
use crate::supervisor::{ReconnectSupervisor, RetryPolicy};

pub struct BotService<T> {
    supervisor: ReconnectSupervisor<T>,
    dispatcher: EventDispatcher,
    state: StateTracker,
    send_timeout: Duration,
    idle_timeout: Duration,
    eviction_interval: Duration,
}

impl<T: Transport> BotService<T> {
    pub fn new(config: &BotConfig, transport: T, registry: HandlerRegistry) -> Self {
        let state = StateTracker::new();
        let supervisor =
            ReconnectSupervisor::new(transport, RetryPolicy::from_config(config), state.clone());
        let dispatcher = EventDispatcher::new(registry, SessionStateStore::new());
        Self {
            supervisor,
            dispatcher,
            state,
            send_timeout: config.send_timeout,
            idle_timeout: config.session_idle_timeout,
            eviction_interval: config.eviction_interval,
        }
    }

    /// Receiver that observes every lifecycle transition.
    pub fn state_watch(&self) -> watch::Receiver<ServiceState> {
        self.state.subscribe()
    }

    pub fn store(&self) -> SessionStateStore {
        self.dispatcher.store().clone()
    }

    /// Runs until `shutdown` is cancelled (`Ok`) or a fatal error occurs (`Err`).
    /// Either way the service ends in `Stopped`.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), BotError> {
        info!(
            handlers = ?self.dispatcher.registry().keys(),
            "Starting bot service"
        );
        self.state.transition(ServiceState::Connecting);

        let sweeper_token = shutdown.child_token();
        let sweeper = EvictionSweeper::new(
            self.dispatcher.store().clone(),
            self.eviction_interval,
            self.idle_timeout,
        )
        .spawn(sweeper_token.clone());

        let connected = tokio::select! {
            biased;
            _ = shutdown.cancelled() => None,
            result = self.supervisor.connect() => Some(result),
        };
        match connected {
            None => return self.shut_down(sweeper_token, sweeper).await,
            Some(Err(e)) => return self.fail(e, sweeper_token, sweeper).await,
            Some(Ok(_)) => {}
        }
        self.state.transition(ServiceState::Running);

        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => None,
                result = self.supervisor.receive() => Some(result),
            };
            match received {
                None => return self.shut_down(sweeper_token, sweeper).await,
                Some(Err(e)) => return self.fail(e, sweeper_token, sweeper).await,
                Some(Ok(event)) => self.process(event).await,
            }
        }
    }

    async fn process(&self, event: Event) {
        let session = self.supervisor.session();
        if session.is_some_and(|s| event.is_from(&s.self_id)) {
            debug!(event_id = %event.id, "Skipping self-authored event");
            return;
        }

        let username = session.and_then(|s| s.username.as_deref());
        for action in self.dispatcher.dispatch_as(event, username).await {
            self.deliver(&action).await;
        }
    }

    /// Sends one action within the send timeout. Failures are logged and the action dropped.
    async fn deliver(&self, action: &Action) {
        let sent = tokio::time::timeout(self.send_timeout, self.supervisor.transport().send(action))
            .await
            .unwrap_or_else(|_| {
                Err(BotError::Network(format!(
                    "send timed out after {}s",
                    self.send_timeout.as_secs()
                )))
            });

        match sent {
            Ok(()) => debug!(conversation_id = %action.conversation_id, "Action sent"),
            Err(e) => warn!(
                conversation_id = %action.conversation_id,
                error = %e,
                "Failed to send action, dropping"
            ),
        }
    }

    async fn shut_down(
        mut self,
        sweeper_token: CancellationToken,
        sweeper: JoinHandle<()>,
    ) -> Result<(), BotError> {
        self.state.transition(ServiceState::ShuttingDown);
        self.supervisor.close().await;
        stop_sweeper(sweeper_token, sweeper).await;
        self.state.transition(ServiceState::Stopped);
        info!("Bot service stopped");
        Ok(())
    }

    async fn fail(
        mut self,
        err: BotError,
        sweeper_token: CancellationToken,
        sweeper: JoinHandle<()>,
    ) -> Result<(), BotError> {
        error!(error = %err, "Bot service stopping on fatal error");
        self.supervisor.close().await;
        stop_sweeper(sweeper_token, sweeper).await;
        self.state.transition(ServiceState::Stopped);
        Err(err)
    }
}

async fn stop_sweeper(token: CancellationToken, handle: JoinHandle<()>) {
    token.cancel();
    if let Err(e) = handle.await {
        warn!(error = %e, "Eviction sweeper task ended abnormally");
    }
}
