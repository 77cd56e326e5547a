//! Run termination signalling

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared stop flag, set at most once per run by the interrupt watcher or the
/// duration timer and polled by the input feeder between rows.
///
/// Relaxed ordering is enough: a racy read costs at most one extra input,
/// which already-dispatched work tolerates.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the run to stop
    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Set the stop flag on the first interrupt signal
pub(crate) fn watch_interrupt(stop: StopFlag) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                println!("Interrupted, stopping...   ");
                stop.set();
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for interrupt");
            }
        }
    });
}

/// Set the stop flag once the configured run duration has elapsed
pub(crate) fn watch_deadline(deadline: Duration, stop: StopFlag) {
    tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        println!("{} elapsed, stopping...   ", humantime::format_duration(deadline));
        stop.set();
    });
}
