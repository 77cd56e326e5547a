//! The per-worker execution loop

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use crate::input::ClientInput;
use crate::traits::{ClientResult, Executor};

use super::rate::RateTicker;

/// Input receiver shared by all workers of a pool. Whoever holds the lock
/// takes the next input; the lock is released as soon as the input arrives.
pub(crate) type SharedInputs = Arc<Mutex<mpsc::Receiver<ClientInput>>>;

/// One worker: an id, its own executor, and the channel ends it works between
pub(crate) struct Worker {
    pub id: usize,
    pub executor: Box<dyn Executor>,
    pub inputs: SharedInputs,
    pub results: mpsc::Sender<ClientResult>,
    pub ticker: Option<RateTicker>,
    pub stagger: Option<Duration>,
}

impl Worker {
    /// Run until the input channel closes, then terminate the executor.
    /// `terminate` runs exactly once on every exit path.
    pub async fn run(mut self) {
        if let Some(delay) = self.stagger {
            tokio::time::sleep(delay).await;
        }
        tracing::debug!(worker_id = self.id, "worker started");

        loop {
            let input = { self.inputs.lock().await.recv().await };
            let Some(input) = input else {
                break;
            };
            if let Some(ticker) = &mut self.ticker {
                ticker.tick().await;
            }
            let result = self.executor.run(&input).await;
            if self.results.send(result).await.is_err() {
                tracing::debug!(worker_id = self.id, "result channel closed");
                break;
            }
        }

        self.executor.terminate().await;
        tracing::debug!(worker_id = self.id, "worker exited");
    }
}
