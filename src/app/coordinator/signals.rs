//! Signal handling for interactive cancellation
//!
//! Ctrl+C (and SIGTERM on Unix) cancels whatever the coordinator has in
//! flight, so the caller gets a `Cancelled` outcome instead of the process
//! dying mid-request.

use std::sync::Arc;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::app::coordinator::SearchCoordinator;

/// Resolve once Ctrl+C or SIGTERM is received
pub async fn wait_for_interrupt() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Ctrl+C signal received");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("SIGTERM signal received");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Spawn a watcher that cancels all of `coordinator`'s operations on interrupt
///
/// Abort the returned handle once the interactive work is done.
pub fn cancel_on_interrupt(coordinator: Arc<SearchCoordinator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_interrupt().await;
        info!("Interrupt received, cancelling in-flight requests");
        coordinator.cancel_all();
    })
}
