//! Run lifecycle: wiring, feeding, shutdown, reporting
//!
//! The orchestrator connects the feeder, the worker pool and the collector
//! with two capacity-one channels, so a slow consumer exerts backpressure on
//! the producer. Shutdown is ordered: the feeder finishes (or observes the
//! stop flag) and drops the input sender; workers drain the channel, call
//! `terminate` and drop their result senders; the collector sees the closed
//! channel and hands the accumulator back for the final report.

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::config::HarnessCli;
use crate::error::{Error, Result};
use crate::input::{Feeder, InputSource};
use crate::results::{spawn_collector, Results};
use crate::signal::{self, StopFlag};
use crate::traits::ExecutorFactory;
use crate::worker::WorkerPool;

/// Execute the benchmark described by `cli` against executors built by
/// `factory`, and print the final report.
pub async fn run<F: ExecutorFactory>(cli: HarnessCli, factory: F) -> Result<()> {
    run_with_profiler(cli, factory, None).await
}

/// [`run`], with an optional diagnostic endpoint.
///
/// The `--pprof` flag is an opaque hook from the harness point of view: when
/// the flag is set and a `profiler` future is supplied, the future is spawned
/// for the whole run and the process parks after the report instead of
/// exiting, keeping the endpoint reachable.
pub async fn run_with_profiler<F: ExecutorFactory>(
    cli: HarnessCli,
    factory: F,
    profiler: Option<BoxFuture<'static, ()>>,
) -> Result<()> {
    cli.validate()?;
    let source = InputSource::from_cli(&cli)?;

    let mut parked = false;
    if cli.profile {
        if let Some(endpoint) = profiler {
            tokio::spawn(endpoint);
            parked = true;
        }
    }

    let stop = StopFlag::new();
    signal::watch_interrupt(stop.clone());
    if let Some(duration) = cli.duration {
        signal::watch_deadline(duration.into(), stop.clone());
    }

    let (input_tx, input_rx) = mpsc::channel(1);
    let (result_tx, result_rx) = mpsc::channel(1);

    let pool = WorkerPool::launch(&factory, &cli, input_rx, result_tx).await?;

    let results = Results::new(cli.progress, cli.periodic_stats);
    let collector = spawn_collector(results, result_rx);

    let feeder = Feeder::new(
        source,
        cli.template.is_some(),
        cli.effective_repeat(),
        stop,
        input_tx,
    );
    tokio::task::spawn_blocking(move || feeder.feed())
        .await
        .map_err(|source| Error::Task {
            task: "feeder",
            source,
        })??;

    tracing::debug!("waiting for workers to finish");
    pool.join().await;

    tracing::debug!("waiting for the collector");
    let results = collector.await.map_err(|source| Error::Task {
        task: "collector",
        source,
    })?;
    results.report().await;

    if parked {
        println!("Run ready, ctrl-c to exit");
        std::future::pending::<()>().await;
    }
    Ok(())
}
