//! Periodic percentile reporting
//!
//! Snapshots are passed by value over a small bounded channel so the
//! reporter can never alias the live accumulator, and the collector pays at
//! most one enqueue on its hot path.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::percentile::{format_value, percentile};

/// Channel capacity between the collector and the reporter
const SNAPSHOT_BUFFER: usize = 2;

/// A point-in-time copy of one stats window
#[derive(Debug)]
pub(crate) struct Snapshot {
    /// Seconds since the run started
    pub secs: f64,
    /// Latencies collected in this window, unsorted
    pub times: Vec<f64>,
    /// Commands completed in this window
    pub cmds: u64,
    /// Commands per second over this window
    pub cps: f64,
}

/// Handle to the dedicated reporter task
pub(crate) struct SnapshotReporter {
    pub tx: mpsc::Sender<Snapshot>,
    pub handle: JoinHandle<()>,
}

impl SnapshotReporter {
    /// Spawn the reporter. It prints the header before the first row and
    /// exits once the sending side closes.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel::<Snapshot>(SNAPSHOT_BUFFER);
        let handle = tokio::spawn(async move {
            let mut first = true;
            while let Some(snapshot) = rx.recv().await {
                if first {
                    println!("Secs\t50% ms\t90% ms\t95% ms\t98% ms\t100% ms\tCmds\tCmds/sec");
                    first = false;
                }
                println!("{}", render_row(snapshot));
            }
            tracing::debug!("snapshot reporter drained");
        });
        Self { tx, handle }
    }
}

/// Format one percentile row; each row sorts its own window
fn render_row(mut snapshot: Snapshot) -> String {
    snapshot.times.sort_by(f64::total_cmp);
    let ms = |percent: f64| format_value(percentile(&snapshot.times, percent) * 1000.0);
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        format_value(snapshot.secs),
        ms(50.0),
        ms(90.0),
        ms(95.0),
        ms(98.0),
        ms(100.0),
        snapshot.cmds,
        format_value(snapshot.cps),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_row_sorts_and_scales_to_ms() {
        let row = render_row(Snapshot {
            secs: 10.0,
            times: vec![0.004, 0.001, 0.002, 0.003],
            cmds: 4,
            cps: 0.4,
        });
        // 50% of 4 samples picks the second one: 2 ms
        assert_eq!(row, "10.0\t2.00\t3.50\t3.50\t3.50\t4.00\t4\t0.400");
    }

    #[test]
    fn test_render_row_empty_window() {
        let row = render_row(Snapshot {
            secs: 5.0,
            times: Vec::new(),
            cmds: 0,
            cps: 0.0,
        });
        assert!(row.starts_with("5.00\t"));
        assert!(row.contains("NaN"));
    }
}
