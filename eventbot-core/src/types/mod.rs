//! Core types: event, action, session state, handler trait.
//!
//! One file per main type, mirroring the message/handler split of the transport layer.

mod action;
mod event;
mod handler;
mod session;

pub use action::Action;
pub use event::Event;
pub use handler::{Handler, HandlerOutcome};
pub use session::{Session, SessionState};
