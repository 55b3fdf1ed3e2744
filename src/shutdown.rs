//! Process stop signals.

use std::future::Future;
use tracing::info;

/// Resolves on Ctrl-C, or SIGTERM on unix, with the name of the signal.
///
/// Handlers are installed before this returns, so a signal delivered while
/// the caller is still starting up is not lost.
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = &'static str>> {
    #[cfg(unix)]
    let mut sigterm = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())?
    };

    Ok(async move {
        #[cfg(unix)]
        let terminate = async move {
            sigterm.recv().await;
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        let name = tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = terminate => "SIGTERM",
        };
        info!(signal = name, "stop signal received");
        name
    })
}
