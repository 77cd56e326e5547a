//! End-to-end tests driving the harness through its public API

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use cmdbench_core::{
    ClientInput, ClientResult, Executor, ExecutorConfig, ExecutorFactory, HarnessCli,
};

// ============================================================================
// Recording executor
// ============================================================================

struct RecordingExecutor {
    config: ExecutorConfig,
    runs: Arc<AtomicUsize>,
    terminations: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn run(&mut self, input: &ClientInput) -> ClientResult {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let cmd = self.config.command(input).into_owned();
        let label = format!("{} OK", cmd.len());
        self.commands.lock().expect("poisoned").push(cmd);
        ClientResult::ok(label, 0.001)
    }

    async fn terminate(&mut self) {
        self.terminations.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct RecordingFactory {
    runs: Arc<AtomicUsize>,
    terminations: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    refuse: bool,
}

#[async_trait]
impl ExecutorFactory for RecordingFactory {
    async fn create(&self, config: ExecutorConfig) -> anyhow::Result<Box<dyn Executor>> {
        if self.refuse {
            anyhow::bail!("factory requires --url");
        }
        Ok(Box::new(RecordingExecutor {
            config,
            runs: Arc::clone(&self.runs),
            terminations: Arc::clone(&self.terminations),
            commands: Arc::clone(&self.commands),
            delay: self.delay,
        }))
    }
}

fn inline_cli(commands: &[&str], clients: usize) -> HarnessCli {
    HarnessCli {
        clients,
        repeat: 1,
        commands: commands.iter().map(|c| c.to_string()).collect(),
        ..HarnessCli::default()
    }
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("cmdbench-test-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).expect("write temp file");
    path
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_inline_commands_run_to_completion() {
    let factory = RecordingFactory::default();
    let runs = Arc::clone(&factory.runs);
    let terminations = Arc::clone(&factory.terminations);

    cmdbench_core::run(inline_cli(&["foo", "bar", "baz"], 1), factory)
        .await
        .expect("run failed");

    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert_eq!(terminations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repeat_multiplies_the_input() {
    let factory = RecordingFactory::default();
    let runs = Arc::clone(&factory.runs);

    let path = temp_file("repeat.txt", "a\nb\nc\nd\ne\nf\ng\nh\ni\nj\n");
    let cli = HarnessCli {
        clients: 3,
        repeat: 4,
        file: Some(path.display().to_string()),
        ..HarnessCli::default()
    };

    cmdbench_core::run(cli, factory).await.expect("run failed");

    // 10 lines, repeated 4 times, shared across 3 workers
    assert_eq!(runs.load(Ordering::SeqCst), 40);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_template_mode_expands_rows() {
    let factory = RecordingFactory::default();
    let commands = Arc::clone(&factory.commands);

    let path = temp_file("data.tsv", "a\tb\nc\td\ne\tf\n");
    let cli = HarnessCli {
        clients: 1,
        repeat: 1,
        file: Some(path.display().to_string()),
        template: Some("$1:$2".into()),
        ..HarnessCli::default()
    };

    cmdbench_core::run(cli, factory).await.expect("run failed");

    let seen = commands.lock().expect("poisoned").clone();
    assert_eq!(seen, vec!["a:b", "c:d", "e:f"]);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_duration_cap_stops_an_endless_feed() {
    let factory = RecordingFactory {
        delay: Some(Duration::from_millis(1)),
        ..RecordingFactory::default()
    };
    let runs = Arc::clone(&factory.runs);

    let mut cli = inline_cli(&["one", "two"], 2);
    cli.duration = Some(Duration::from_millis(300).into());

    let start = Instant::now();
    cmdbench_core::run(cli, factory).await.expect("run failed");
    let elapsed = start.elapsed();

    assert!(runs.load(Ordering::SeqCst) > 0);
    // the cap plus in-flight slack, far below the inflated repeat count
    assert!(elapsed < Duration::from_secs(5), "ran for {elapsed:?}");
}

#[tokio::test]
async fn test_empty_input_still_reports() {
    let factory = RecordingFactory::default();
    let runs = Arc::clone(&factory.runs);
    let terminations = Arc::clone(&factory.terminations);

    let path = temp_file("empty.txt", "");
    let cli = HarnessCli {
        clients: 2,
        repeat: 1,
        file: Some(path.display().to_string()),
        ..HarnessCli::default()
    };

    cmdbench_core::run(cli, factory).await.expect("run failed");

    assert_eq!(runs.load(Ordering::SeqCst), 0);
    assert_eq!(terminations.load(Ordering::SeqCst), 2);
    let _ = std::fs::remove_file(path);
}

#[tokio::test]
async fn test_conflicting_flags_are_user_errors() {
    let mut cli = inline_cli(&["cmd"], 1);
    cli.progress = true;
    cli.periodic_stats = Some(2);

    let err = cmdbench_core::run(cli, RecordingFactory::default())
        .await
        .expect_err("run should fail");
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_missing_source_is_a_user_error() {
    let cli = HarnessCli {
        clients: 1,
        repeat: 1,
        ..HarnessCli::default()
    };

    let err = cmdbench_core::run(cli, RecordingFactory::default())
        .await
        .expect_err("run should fail");
    assert_eq!(err.exit_code(), 1);
    assert!(err.to_string().contains("-f filename"));
}

#[tokio::test]
async fn test_factory_failure_exits_with_code_two() {
    let factory = RecordingFactory {
        refuse: true,
        ..RecordingFactory::default()
    };

    let err = cmdbench_core::run(inline_cli(&["cmd"], 2), factory)
        .await
        .expect_err("run should fail");
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("factory requires --url"));
}

#[tokio::test]
async fn test_periodic_stats_run_completes() {
    let factory = RecordingFactory::default();
    let runs = Arc::clone(&factory.runs);

    let mut cli = inline_cli(&["alpha", "beta"], 1);
    cli.periodic_stats = Some(1);

    cmdbench_core::run(cli, factory).await.expect("run failed");
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
