//! Multi-client command benchmarking harness
//!
//! cmdbench-core drives a pluggable command executor at configurable
//! parallelism against a stream of input commands, measures per-command
//! latency, and reports result counts, error counts, throughput and latency
//! percentiles. It provides:
//!
//! - The shared command-line flag set ([`HarnessCli`])
//! - Input feeding from inline commands, stdin or a file, with `$1`-`$9`
//!   command templates over tab-separated rows ([`Template`])
//! - The worker pool with per-worker rate limiting and staggered startup
//! - The streaming results collector and the periodic percentile reporter
//!
//! A workload binary implements [`Executor`] and [`ExecutorFactory`], parses
//! its own flags around the flattened [`HarnessCli`], and hands both to
//! [`run`]:
//!
//! ```ignore
//! #[derive(clap::Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     harness: cmdbench_core::HarnessCli,
//! }
//!
//! let cli = Cli::parse();
//! cmdbench_core::init_tracing(cli.harness.verbose);
//! if let Err(err) = cmdbench_core::run(cli.harness, MyFactory).await {
//!     eprintln!("{err}");
//!     std::process::exit(err.exit_code());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod input;
pub mod orchestrator;
pub mod percentile;
pub mod results;
pub mod signal;
pub mod template;
pub mod traits;
pub mod worker;

mod snapshot;

pub use config::HarnessCli;
pub use error::{Error, Result};
pub use input::{ClientInput, InputSource};
pub use orchestrator::{run, run_with_profiler};
pub use signal::StopFlag;
pub use template::Template;
pub use traits::{ClientResult, Executor, ExecutorConfig, ExecutorFactory};

/// Install the global tracing subscriber for a client binary.
///
/// Logs go to stderr so they never interleave with the report formats on
/// stdout. `RUST_LOG` overrides the default level (`debug` with `-v`,
/// `warn` otherwise).
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
