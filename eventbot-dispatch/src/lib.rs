//! # Event dispatch
//!
//! [`HandlerRegistry`] maps command names and event types to handlers at startup;
//! [`EventDispatcher`] routes each event to its handler (command, then mention, then type),
//! threads the conversation's [`SessionState`](eventbot_core::SessionState) through it, and
//! contains handler failures so that one bad event never stops the loop.

mod dispatcher;
mod registry;

pub use dispatcher::{EventDispatcher, MENTION_ROUTE};
pub use registry::HandlerRegistry;

// Integration tests live in tests/dispatcher_test.rs
