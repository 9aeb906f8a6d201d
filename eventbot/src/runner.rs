//! Wires the transport, registry, and service, and runs until a signal or fatal error.

use std::sync::Arc;

use eventbot_core::Result;
use eventbot_dispatch::{HandlerRegistry, MENTION_ROUTE};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::config::BotConfig;
use crate::handlers::{EchoHandler, HelpHandler};
use crate::service::BotService;
use crate::transport::HttpTransport;

/// Registry with the bundled handlers: `echo` (command and event type), `help`, and
/// `mention`, which echoes messages that address the bot by username.
pub fn build_registry() -> Result<HandlerRegistry> {
    HandlerRegistry::new()
        .with_handler("echo", Arc::new(EchoHandler::new()))?
        .with_handler(MENTION_ROUTE, Arc::new(EchoHandler::new()))?
        .with_handler("help", Arc::new(HelpHandler::new(["echo", "help"])))
}

/// Main entry: builds the HTTP transport and the service, then runs until SIGINT/SIGTERM.
#[instrument(skip(config), fields(api_url = %config.api_url))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    let transport = HttpTransport::new(&config)?;
    let registry = build_registry()?;
    let service = BotService::new(&config, transport, registry);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    info!(token = %config.redacted_token(), "Bot starting");
    service.run(shutdown).await
}

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is logged and ignored.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry_has_bundled_handlers() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.keys(), vec!["echo", "help", "mention"]);
    }
}
