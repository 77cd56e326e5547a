//! Dummy executor for local testing
//!
//! Runs no real workload: the result label is the rendered command length
//! and the reported latency is synthetic, which makes it handy for exercising
//! the collector and the report formats.

use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;

use cmdbench_core::{ClientInput, ClientResult, Executor, ExecutorConfig, ExecutorFactory};

#[derive(Parser, Debug)]
#[command(name = "cmdbench-dummy", version, about = "Dummy workload for cmdbench")]
struct Cli {
    #[command(flatten)]
    harness: cmdbench_core::HarnessCli,

    /// Sleep in nanoseconds per command (real resolution depends on OS)
    #[arg(long = "ns-delay", default_value_t = 0, value_name = "NS")]
    ns_delay: u64,

    /// Upper bound in nanoseconds for random result times
    #[arg(long = "ns-max", default_value_t = 0.0, value_name = "NS")]
    ns_max: f64,

    /// Nanoseconds added to the result time after each command
    #[arg(long = "ns-add", default_value_t = 0.0, value_name = "NS")]
    ns_add: f64,
}

struct DummyExecutor {
    config: ExecutorConfig,
    ns_delay: u64,
    ns_max: f64,
    ns_add: f64,
    delta: f64,
}

#[async_trait]
impl Executor for DummyExecutor {
    async fn run(&mut self, input: &ClientInput) -> ClientResult {
        let cmd = self.config.command(input);

        if self.ns_delay > 0 {
            tokio::time::sleep(Duration::from_nanos(self.ns_delay)).await;
        }
        if self.config.verbose {
            tracing::debug!(id = self.config.id, command = %cmd, "dummy run");
        }

        let elapsed = self.ns_max / 1e9 * rand::random::<f64>() + self.delta;
        self.delta += self.ns_add / 1e9;
        ClientResult::ok(format!("{} OK", cmd.len()), elapsed)
    }

    async fn terminate(&mut self) {
        tracing::debug!(id = self.config.id, "dummy term");
    }
}

struct DummyFactory {
    ns_delay: u64,
    ns_max: f64,
    ns_add: f64,
}

#[async_trait]
impl ExecutorFactory for DummyFactory {
    async fn create(&self, config: ExecutorConfig) -> anyhow::Result<Box<dyn Executor>> {
        tracing::debug!(id = config.id, "dummy init");
        Ok(Box::new(DummyExecutor {
            config,
            ns_delay: self.ns_delay,
            ns_max: self.ns_max,
            ns_add: self.ns_add,
            delta: 0.0,
        }))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cmdbench_core::init_tracing(cli.harness.verbose);

    let factory = DummyFactory {
        ns_delay: cli.ns_delay,
        ns_max: cli.ns_max,
        ns_add: cli.ns_add,
    };
    if let Err(err) = cmdbench_core::run(cli.harness, factory).await {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}
