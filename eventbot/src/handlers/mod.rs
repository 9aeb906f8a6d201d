//! Bundled handlers: echo and help.

mod echo_handler;
mod help_handler;

pub use echo_handler::EchoHandler;
pub use help_handler::HelpHandler;
