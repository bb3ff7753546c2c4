//! Graceful shutdown coordinator.
//!
//! The sync loop checks a [`CancellationToken`] between pages, so the
//! first SIGINT (Ctrl+C), SIGTERM or SIGHUP lets the current page drain
//! and the checkpoint commit. A second signal force-exits.

use tokio_util::sync::CancellationToken;

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    let mut sighup = signal(SignalKind::hangup()).expect("failed to register SIGHUP handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
        _ = sighup.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for Ctrl+C");
}

/// Install signal handlers and return the token the sync loop polls.
/// Cancelled on the first signal; exits 130 on the second.
pub(crate) fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();

    let handler_token = token.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Received shutdown signal, finishing the current page...");
        tracing::info!("Press Ctrl+C again to force exit");
        handler_token.cancel();

        wait_for_signal().await;
        tracing::warn!("Force exit requested");
        std::process::exit(130);
    });

    token
}
