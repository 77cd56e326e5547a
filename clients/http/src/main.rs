//! HTTP executor
//!
//! Commands have the form `VERB URL [BODY]`. Each worker owns its own
//! `reqwest::Client`, so connection pools are reused across commands without
//! any locking. The result label is the HTTP status line (e.g. `200 OK`), so
//! the final report counts responses per status.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use clap::Parser;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;

use cmdbench_core::{ClientInput, ClientResult, Executor, ExecutorConfig, ExecutorFactory};

#[derive(Parser, Debug)]
#[command(name = "cmdbench-http", version, about = "HTTP workload for cmdbench")]
struct Cli {
    #[command(flatten)]
    harness: cmdbench_core::HarnessCli,

    /// HTTP Authorization header
    #[arg(long = "auth", value_name = "VALUE")]
    auth: Option<String>,

    /// HTTP body content type
    #[arg(long = "content-type", default_value = "application/json", value_name = "TYPE")]
    content_type: String,

    /// HTTP client timeout in seconds
    #[arg(long = "timeout", default_value_t = 10, value_name = "SECS")]
    timeout: u64,
}

#[derive(Clone)]
struct HttpOptions {
    auth: Option<String>,
    content_type: String,
    timeout: u64,
}

struct HttpExecutor {
    config: ExecutorConfig,
    options: HttpOptions,
    client: reqwest::Client,
}

/// `VERB URL [BODY]`, split on the first two spaces
fn split_command(cmd: &str) -> Option<(&str, &str, &str)> {
    let mut parts = cmd.splitn(3, ' ');
    let verb = parts.next()?.trim_matches(['\r', '\t', ' ']);
    let url = parts.next()?.trim_matches(['\r', '\t', ' ']);
    if verb.is_empty() || url.is_empty() {
        return None;
    }
    let body = parts.next().unwrap_or("").trim_matches(['\r', '\t']);
    Some((verb, url, body))
}

fn status_label(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[async_trait]
impl Executor for HttpExecutor {
    async fn run(&mut self, input: &ClientInput) -> ClientResult {
        let cmd = self.config.command(input);

        let Some((verb, url, body)) = split_command(&cmd) else {
            return ClientResult::err(
                anyhow::anyhow!("invalid command {cmd}, HTTP verb and URL required"),
                0.0,
            );
        };
        let method = match Method::from_bytes(verb.as_bytes()) {
            Ok(method) => method,
            Err(err) => return ClientResult::err(err, 0.0),
        };

        let mut request = self.client.request(method, url);
        if !body.is_empty() {
            request = request
                .header(CONTENT_TYPE, &self.options.content_type)
                .body(body.to_owned());
        }
        if let Some(auth) = &self.options.auth {
            request = request.header(AUTHORIZATION, auth);
        }

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return ClientResult::err(err, start.elapsed().as_secs_f64()),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default().replace('\n', " ");
            tracing::warn!(
                id = self.config.id,
                status = status.as_u16(),
                body,
                "http response"
            );
        } else {
            // drain the body so the connection can be reused, and so the
            // measured time includes the transfer
            let _ = response.bytes().await;
        }

        // final time includes body read time
        let elapsed = start.elapsed().as_secs_f64();
        let label = status_label(status);
        if self.config.verbose {
            tracing::debug!(id = self.config.id, command = %cmd, result = %label, "http run");
        }
        ClientResult::ok(label, elapsed)
    }

    async fn terminate(&mut self) {
        tracing::debug!(id = self.config.id, "http term");
    }
}

struct HttpFactory {
    options: HttpOptions,
}

#[async_trait]
impl ExecutorFactory for HttpFactory {
    async fn create(&self, config: ExecutorConfig) -> anyhow::Result<Box<dyn Executor>> {
        tracing::debug!(id = config.id, "http init");
        // each worker keeps its own small connection pool
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.options.timeout))
            .danger_accept_invalid_certs(true)
            .pool_max_idle_per_host(2)
            .build()?;
        Ok(Box::new(HttpExecutor {
            config,
            options: self.options.clone(),
            client,
        }))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cmdbench_core::init_tracing(cli.harness.verbose);

    let factory = HttpFactory {
        options: HttpOptions {
            auth: cli.auth,
            content_type: cli.content_type,
            timeout: cli.timeout,
        },
    };
    if let Err(err) = cmdbench_core::run(cli.harness, factory).await {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}
