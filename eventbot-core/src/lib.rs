//! # eventbot-core
//!
//! Core types and traits for the event bot: [`Transport`], [`Handler`], [`Event`], [`Action`],
//! [`SessionState`] and its [`SessionStateStore`], the error taxonomy, and tracing initialization.
//! Transport-agnostic; used by eventbot-dispatch and eventbot.

pub mod error;
pub mod logger;
pub mod session_store;
pub mod transport;
pub mod types;

pub use error::{BotError, HandlerError, Result};
pub use logger::init_tracing;
pub use session_store::SessionStateStore;
pub use transport::Transport;
pub use types::{Action, Event, Handler, HandlerOutcome, Session, SessionState};
