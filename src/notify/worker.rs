use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::dispatcher::run_once;
use crate::AppState;

/// Handle to the background dispatcher task
pub struct DispatcherHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl DispatcherHandle {
    /// Stop the worker and wait for it to exit.
    ///
    /// A run already in progress is allowed to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "Notification dispatcher task panicked");
        }
    }
}

/// Start the background dispatcher.
///
/// The first run starts immediately. Each following run starts one interval
/// after the previous run finished, so runs never overlap.
pub fn start_dispatcher(state: Arc<AppState>) -> DispatcherHandle {
    let interval = state.config.notify.interval();
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        info!(interval_seconds = interval.as_secs(), "Notification dispatcher started");
        while !token.is_cancelled() {
            run_once(&state).await;

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        info!("Notification dispatcher stopped");
    });

    DispatcherHandle { cancel, task }
}
