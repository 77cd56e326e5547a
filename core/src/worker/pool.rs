//! Worker pool launch and teardown

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::config::HarnessCli;
use crate::error::{Error, Result};
use crate::input::ClientInput;
use crate::template::Template;
use crate::traits::{ClientResult, ExecutorConfig, ExecutorFactory};

use super::rate::RateTicker;
use super::runner::Worker;

/// A set of spawned workers sharing one input channel
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Create one executor per worker and spawn the workers.
    ///
    /// All executors are built before anything starts; the first factory
    /// failure aborts the launch and nothing runs. Each worker gets its own
    /// parsed template and, with `-D`, a startup delay of `id` times the
    /// stagger duration.
    pub async fn launch(
        factory: &dyn ExecutorFactory,
        cli: &HarnessCli,
        inputs: mpsc::Receiver<ClientInput>,
        results: mpsc::Sender<ClientResult>,
    ) -> Result<Self> {
        let mut executors = Vec::with_capacity(cli.clients);
        for id in 0..cli.clients {
            let config = ExecutorConfig {
                id,
                template: cli.template.as_deref().and_then(Template::parse),
                verbose: cli.verbose,
            };
            let executor = factory.create(config).await.map_err(Error::Factory)?;
            executors.push(executor);
        }

        let inputs = Arc::new(Mutex::new(inputs));
        let stagger: Option<Duration> = cli.stagger.map(Into::into);
        let mut handles = Vec::with_capacity(executors.len());
        for (id, executor) in executors.into_iter().enumerate() {
            let worker = Worker {
                id,
                executor,
                inputs: Arc::clone(&inputs),
                results: results.clone(),
                ticker: cli.rate_limit.map(RateTicker::new),
                stagger: stagger.map(|step| step * id as u32),
            };
            handles.push(tokio::spawn(worker.run()));
        }

        Ok(Self { handles })
    }

    /// Number of workers in the pool
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether the pool has no workers
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to drain the input channel and exit
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(err) = handle.await {
                tracing::error!(error = %err, "worker task panicked");
            }
        }
    }
}
