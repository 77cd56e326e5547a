//! The executor contract implemented by workload plugins
//!
//! A plugin supplies an [`ExecutorFactory`] that builds one [`Executor`] per
//! worker. The harness guarantees each executor instance is driven by exactly
//! one worker for its whole lifetime, so implementations can keep connection
//! pools and scratch buffers without any internal locking.

use std::borrow::Cow;

use async_trait::async_trait;

use crate::input::ClientInput;
use crate::template::Template;

/// Outcome of running one command
#[derive(Debug)]
pub struct ClientResult {
    /// Result label; the count of each distinct value is reported.
    /// Empty means "nothing to count".
    pub label: String,
    /// Execution time in seconds; percentiles are reported
    pub elapsed: f64,
    /// Error outcome; errors are counted by their display form
    pub error: Option<anyhow::Error>,
}

impl ClientResult {
    /// A successful result with the given label
    pub fn ok(label: impl Into<String>, elapsed: f64) -> Self {
        Self {
            label: label.into(),
            elapsed,
            error: None,
        }
    }

    /// A failed result; the command still counts and its latency is kept
    pub fn err(error: impl Into<anyhow::Error>, elapsed: f64) -> Self {
        Self {
            label: String::new(),
            elapsed,
            error: Some(error.into()),
        }
    }
}

/// Per-executor configuration handed to the factory
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Worker id in `[0, clients)`
    pub id: usize,
    /// Parsed command template, `None` in line-oriented command mode
    pub template: Option<Template>,
    /// Verbose logging requested on the command line
    pub verbose: bool,
}

impl ExecutorConfig {
    /// Render an input to its command string: raw commands pass through,
    /// argument rows expand through the template.
    pub fn command<'a>(&self, input: &'a ClientInput) -> Cow<'a, str> {
        match (input, &self.template) {
            (ClientInput::Cmd(cmd), _) => Cow::Borrowed(cmd.as_str()),
            (ClientInput::Args(args), Some(template)) => Cow::Owned(template.expand(args)),
            // an argument row without a template only happens if a plugin
            // feeds inputs by hand; join it back into one line
            (ClientInput::Args(args), None) => Cow::Owned(args.join("\t")),
        }
    }
}

/// A workload executor owned by a single worker
#[async_trait]
pub trait Executor: Send {
    /// Execute one command and report its outcome. Per-command failures are
    /// returned inside the [`ClientResult`], not as a task error.
    async fn run(&mut self, input: &ClientInput) -> ClientResult;

    /// Release resources. Called exactly once, after the input stream closes.
    async fn terminate(&mut self);
}

/// Builds one executor per worker before any worker starts
#[async_trait]
pub trait ExecutorFactory: Send + Sync {
    /// Construct the executor for worker `config.id`. Any failure aborts the
    /// whole run before feeding begins.
    async fn create(&self, config: ExecutorConfig) -> anyhow::Result<Box<dyn Executor>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_passthrough_without_template() {
        let config = ExecutorConfig {
            id: 0,
            template: None,
            verbose: false,
        };
        let input = ClientInput::Cmd("GET /ping".into());
        assert_eq!(config.command(&input), "GET /ping");
    }

    #[test]
    fn test_command_expands_argument_rows() {
        let config = ExecutorConfig {
            id: 0,
            template: Template::parse("GET /users/$1?fields=$2"),
            verbose: false,
        };
        let input = ClientInput::Args(vec!["42".into(), "name".into()]);
        assert_eq!(config.command(&input), "GET /users/42?fields=name");
    }

    #[test]
    fn test_result_constructors() {
        let ok = ClientResult::ok("200 OK", 0.25);
        assert_eq!(ok.label, "200 OK");
        assert!(ok.error.is_none());

        let err = ClientResult::err(anyhow::anyhow!("connection refused"), 0.1);
        assert!(err.label.is_empty());
        assert_eq!(err.error.expect("error").to_string(), "connection refused");
    }
}
