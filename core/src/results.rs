//! Result collection and reporting
//!
//! The collector task owns all mutable statistics; results reach it over the
//! output channel and nothing else ever touches the accumulator. Time is
//! read from the monotonic clock only.

use std::collections::HashMap;
use std::io::Write;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::percentile::{format_value, percentile};
use crate::snapshot::{Snapshot, SnapshotReporter};
use crate::traits::ClientResult;

/// Accumulated statistics for one run
pub struct Results {
    start: Instant,
    count: u64,
    last_count: u64,
    last_stats: Instant,
    last_progress: Instant,
    times: Vec<f64>,
    labels: HashMap<String, u64>,
    errors: HashMap<String, u64>,
    progress: bool,
    periodic_secs: Option<u64>,
    reporter: Option<SnapshotReporter>,
}

impl Results {
    /// Create an empty accumulator. With periodic stats enabled this also
    /// spawns the snapshot reporter task.
    pub fn new(progress: bool, periodic_secs: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            count: 0,
            last_count: 0,
            last_stats: now,
            last_progress: now,
            times: Vec::new(),
            labels: HashMap::new(),
            errors: HashMap::new(),
            progress,
            periodic_secs,
            reporter: periodic_secs.map(|_| SnapshotReporter::spawn()),
        }
    }

    /// Total commands seen so far
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Count per result label
    pub fn labels(&self) -> &HashMap<String, u64> {
        &self.labels
    }

    /// Count per error rendering
    pub fn errors(&self) -> &HashMap<String, u64> {
        &self.errors
    }

    /// Latencies collected since the last snapshot, in seconds
    pub fn latencies(&self) -> &[f64] {
        &self.times
    }

    /// Fold one result into the accumulator
    pub async fn update(&mut self, result: ClientResult) {
        self.count += 1;
        self.times.push(result.elapsed);
        if !result.label.is_empty() {
            *self.labels.entry(result.label).or_insert(0) += 1;
        }
        if let Some(error) = result.error {
            *self.errors.entry(error.to_string()).or_insert(0) += 1;
        }

        // progress and periodic output are throttled to once per wall-second
        let now = Instant::now();
        if now.duration_since(self.last_progress) < Duration::from_secs(1) {
            return;
        }
        self.last_progress = now;
        if self.progress {
            self.print_progress(now);
        } else if let Some(secs) = self.periodic_secs {
            if now.duration_since(self.last_stats) >= Duration::from_secs(secs) {
                self.publish_snapshot(now).await;
            }
        }
    }

    fn print_progress(&self, now: Instant) {
        let secs = now.duration_since(self.start).as_secs();
        let elapsed = now.duration_since(self.start).as_secs_f64();
        let cps = if elapsed > 0.0 {
            self.count as f64 / elapsed
        } else {
            0.0
        };
        print!(
            "{}s {} commands in {}s, {} cmds/sec\r",
            secs,
            self.count,
            secs,
            format_value(cps)
        );
        let _ = std::io::stdout().flush();
    }

    /// Hand the current window to the reporter and reset the window markers.
    /// The latency vector is taken out whole so the reporter owns it.
    async fn publish_snapshot(&mut self, now: Instant) {
        let Some(reporter) = &self.reporter else {
            return;
        };
        let window = now.duration_since(self.last_stats).as_secs_f64();
        let cmds = self.count - self.last_count;
        let snapshot = Snapshot {
            secs: now.duration_since(self.start).as_secs_f64(),
            times: std::mem::take(&mut self.times),
            cmds,
            cps: if window > 0.0 { cmds as f64 / window } else { 0.0 },
        };
        if reporter.tx.send(snapshot).await.is_err() {
            tracing::error!("snapshot reporter went away");
        }
        self.last_count = self.count;
        self.last_stats = now;
    }

    /// Print the final report. With periodic stats enabled this first drains
    /// one last snapshot and the overall percentile block is omitted.
    pub async fn report(mut self) {
        if self.reporter.is_some() {
            if self.count > self.last_count {
                self.publish_snapshot(Instant::now()).await;
            }
            if let Some(reporter) = self.reporter.take() {
                drop(reporter.tx);
                let _ = reporter.handle.await;
            }
        }

        print_counts("Result counts:", &self.labels);
        if !self.errors.is_empty() {
            print_counts("Error counts:", &self.errors);
        }

        let elapsed = self.start.elapsed().as_secs_f64();
        let cps = if elapsed > 0.0 {
            self.count as f64 / elapsed
        } else {
            0.0
        };
        println!(
            "Total {} commands in {} seconds, {} cmds/sec",
            self.count,
            format_value(elapsed),
            format_value(cps)
        );

        if self.periodic_secs.is_none() {
            self.times.sort_by(f64::total_cmp);
            println!("Latency percentiles:");
            for p in [50u32, 90, 95, 98, 100] {
                println!(
                    "{:>3}%\t{} ms",
                    p,
                    format_value(percentile(&self.times, f64::from(p)) * 1000.0)
                );
            }
        }
    }
}

/// Print a heading and the counts in increasing alphabetical order of keys
fn print_counts(heading: &str, counts: &HashMap<String, u64>) {
    println!("{heading}");
    for (key, count) in sorted_counts(counts) {
        println!("{count}\t{key}");
    }
}

/// Deterministic iteration order for reporting
fn sorted_counts(counts: &HashMap<String, u64>) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by_key(|(key, _)| *key);
    entries
}

/// Spawn the collector task; it returns the accumulator once the output
/// channel closes
pub(crate) fn spawn_collector(
    mut results: Results,
    mut rx: mpsc::Receiver<ClientResult>,
) -> JoinHandle<Results> {
    tokio::spawn(async move {
        tracing::debug!("waiting for results");
        while let Some(result) = rx.recv().await {
            results.update(result).await;
        }
        tracing::debug!("results collected");
        results
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_counts_labels_and_errors() {
        let mut results = Results::new(false, None);
        results.update(ClientResult::ok("200 OK", 0.010)).await;
        results.update(ClientResult::ok("200 OK", 0.020)).await;
        results.update(ClientResult::ok("404 Not Found", 0.005)).await;
        results
            .update(ClientResult::err(anyhow::anyhow!("connection refused"), 0.0))
            .await;

        assert_eq!(results.count(), 4);
        assert_eq!(results.latencies().len(), 4);
        assert_eq!(results.labels()["200 OK"], 2);
        assert_eq!(results.labels()["404 Not Found"], 1);
        assert_eq!(results.errors()["connection refused"], 1);
    }

    #[tokio::test]
    async fn test_error_results_still_count_latency() {
        let mut results = Results::new(false, None);
        results
            .update(ClientResult::err(anyhow::anyhow!("boom"), 0.5))
            .await;
        assert_eq!(results.count(), 1);
        assert_eq!(results.latencies(), &[0.5]);
        assert!(results.labels().is_empty());
    }

    #[tokio::test]
    async fn test_empty_label_is_not_counted() {
        let mut results = Results::new(false, None);
        results.update(ClientResult::ok("", 0.1)).await;
        assert_eq!(results.count(), 1);
        assert!(results.labels().is_empty());
    }

    #[test]
    fn test_sorted_counts_is_lexicographic() {
        let mut counts = HashMap::new();
        counts.insert("4 OK".to_string(), 1);
        counts.insert("3 OK".to_string(), 2);
        counts.insert("200 OK".to_string(), 5);
        let sorted: Vec<&str> = sorted_counts(&counts).into_iter().map(|(k, _)| k).collect();
        assert_eq!(sorted, vec!["200 OK", "3 OK", "4 OK"]);
    }

    #[tokio::test]
    async fn test_collector_drains_channel() {
        let (tx, rx) = mpsc::channel(8);
        let handle = spawn_collector(Results::new(false, None), rx);
        for i in 0..5 {
            tx.send(ClientResult::ok(format!("{i} OK"), 0.001))
                .await
                .expect("send failed");
        }
        drop(tx);
        let results = handle.await.expect("collector died");
        assert_eq!(results.count(), 5);
        assert_eq!(results.labels().len(), 5);
    }
}
