//! Background reclamation of expired one-time codes and lapsed rate-limit
//! windows. Purely janitorial: foreground reads re-check expiry themselves,
//! so a late or failed sweep never affects correctness, and sweep errors are
//! logged and swallowed.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::AppState;

pub struct Sweeper {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Signal the task and wait for it to drain.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}

/// Start the periodic sweep task. Owned by the process supervisor: started
/// after wiring, stopped on shutdown.
pub fn spawn(state: AppState, every: Duration) -> Sweeper {
    let (stop, mut stopped) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        // The immediate first tick sweeps empty stores; harmless.
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    match state.otp_manager().sweep_expired().await {
                        Ok(0) => {}
                        Ok(removed) => {
                            tracing::debug!(removed, "swept expired sign-in codes");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "sign-in code sweep failed");
                        }
                    }
                    match state.rate_limiter().sweep_expired().await {
                        Ok(0) => {}
                        Ok(removed) => {
                            tracing::debug!(removed, "swept lapsed rate-limit windows");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "rate-limit sweep failed");
                        }
                    }
                }
                _ = stopped.changed() => break,
            }
        }
    });
    Sweeper { stop, handle }
}
