//! Error types for the bot core.
//!
//! [`BotError`] is the top-level error and encodes the retry policy of each failure;
//! [`HandlerError`] is used for handler failures and never leaves the dispatch boundary.

use thiserror::Error;

/// Top-level error for the bot (config, auth, transport, handler, fatal exhaustion).
#[derive(Error, Debug)]
pub enum BotError {
    /// Missing or malformed configuration, or a programmer error at startup.
    #[error("Config error: {0}")]
    Config(String),

    /// Credentials were rejected by the remote service.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Transport failure while connecting or sending.
    #[error("Network error: {0}")]
    Network(String),

    /// The live connection dropped while waiting for events.
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    /// The remote service refused an outbound action as invalid.
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    /// Reconnect attempts exhausted.
    #[error("Service unavailable after {attempts} attempts: {last_error}")]
    ServiceUnavailable { attempts: u32, last_error: String },
}

impl BotError {
    /// Transient failures that the reconnect supervisor retries.
    pub fn is_retriable(&self) -> bool {
        matches!(self, BotError::Network(_) | BotError::ConnectionLost(_))
    }

    /// Failures that terminate the process.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BotError::Config(_) | BotError::Auth(_) | BotError::ServiceUnavailable { .. }
        )
    }

    /// Process exit code for a fatal error.
    pub fn exit_code(&self) -> u8 {
        match self {
            BotError::Config(_) => 2,
            BotError::Auth(_) => 3,
            BotError::ServiceUnavailable { .. } => 4,
            _ => 1,
        }
    }
}

/// Errors produced by handlers (bad command, missing payload, state, generic failure).
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Missing payload: {0}")]
    MissingPayload(String),

    #[error("State error: {0}")]
    State(String),

    #[error("Handler failed: {0}")]
    Failed(String),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

/// Result type for core operations; uses [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;
