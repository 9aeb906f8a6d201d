//! # eventbot
//!
//! Event-driven bot service: a transport delivers events, the dispatcher routes each one to a
//! registered handler with its conversation state, and the resulting actions are sent back.
//! Transient connection failures are retried with backoff; idle conversation state is evicted
//! in the background.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod runner;
pub mod service;
pub mod supervisor;
pub mod transport;

pub use cli::{load_config, Cli, Commands};
pub use config::BotConfig;
pub use handlers::{EchoHandler, HelpHandler};
pub use runner::{build_registry, run_bot, shutdown_signal};
pub use service::{BotService, EvictionSweeper, ServiceState, StateTracker};
pub use supervisor::{ReconnectSupervisor, RetryPolicy};
pub use transport::HttpTransport;

pub use eventbot_core::{
    init_tracing, Action, BotError, Event, Handler, HandlerError, HandlerOutcome, Session,
    SessionState, SessionStateStore, Transport,
};
pub use eventbot_dispatch::{EventDispatcher, HandlerRegistry, MENTION_ROUTE};
