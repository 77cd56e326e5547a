//! Worker pool for executing commands
//!
//! A worker is the core execution unit of the harness: a tokio task that
//! owns one executor and loops **receive -> rate tick -> run -> report**
//! until the input channel closes. Workers share a single input receiver, so
//! inputs are handed out first-come-first-served and a slow worker never
//! stalls the others.
//!
//! # Example
//!
//! ```ignore
//! use cmdbench_core::worker::WorkerPool;
//!
//! let pool = WorkerPool::launch(&factory, &cli, input_rx, result_tx).await?;
//! // ... feed inputs, then drop the input sender ...
//! pool.join().await;
//! ```

mod pool;
mod rate;
mod runner;

pub use pool::WorkerPool;
pub use rate::RateTicker;
