use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

/// Cancels `root` on the first SIGTERM or SIGINT.
///
/// Signal streams are registered before returning, so a signal arriving right
/// after startup is not missed.
pub fn install_shutdown_handler(root: CancellationToken) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
            _ = root.cancelled() => return,
        }

        root.cancel();
    });

    Ok(())
}
