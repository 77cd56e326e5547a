//! The shared command-line flag set
//!
//! Client binaries embed [`HarnessCli`] with `#[command(flatten)]` and extend
//! it with their own long-form flags; the short flags below belong to the
//! harness.

use clap::Parser;

use crate::error::{Error, Result};

/// Core benchmarking flags, shared by every client binary
#[derive(Parser, Debug, Clone, Default)]
pub struct HarnessCli {
    /// Input file name, stdin if '-'
    #[arg(short = 'f', value_name = "PATH")]
    pub file: Option<String>,

    /// Command template, $1-$9 refer to tab-separated columns in the input
    #[arg(short = 't', value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Number of parallel clients executing commands
    #[arg(short = 'c', default_value_t = 1, value_name = "N")]
    pub clients: usize,

    /// Repeat the input N times, does not work with stdin
    #[arg(short = 'r', default_value_t = 1, value_name = "N")]
    pub repeat: usize,

    /// Run until the given duration elapses, e.g. 5m for 5 minutes
    #[arg(short = 'd', value_name = "DUR")]
    pub duration: Option<humantime::Duration>,

    /// Stagger client startup: client N starts after N times this duration
    #[arg(short = 'D', value_name = "DUR")]
    pub stagger: Option<humantime::Duration>,

    /// Rate limit each client to N commands/sec (accuracy depends on OS)
    #[arg(short = 'R', value_name = "N")]
    pub rate_limit: Option<u32>,

    /// Report progress once a second
    #[arg(short = 'P')]
    pub progress: bool,

    /// Show and reset percentiles every N seconds
    #[arg(short = 'S', value_name = "N")]
    pub periodic_stats: Option<u64>,

    /// Verbose logging
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Enable the diagnostic endpoint hook
    #[arg(long = "pprof")]
    pub profile: bool,

    /// Inline commands, run instead of reading an input file
    #[arg(value_name = "CMD")]
    pub commands: Vec<String>,
}

impl HarnessCli {
    /// Reject flag combinations the harness cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.clients == 0 {
            return Err(Error::Config("-c must be at least 1".into()));
        }
        if !self.commands.is_empty() && self.file.is_some() {
            return Err(Error::Config(
                "cannot use -f with command line commands, use -t template with -f".into(),
            ));
        }
        if self.file.as_deref() == Some("-") && self.repeat > 1 {
            return Err(Error::Config("cannot use -r with stdin".into()));
        }
        if self.progress && self.periodic_stats.is_some() {
            return Err(Error::Config(
                "cannot report progress and periodic percentiles at the same time".into(),
            ));
        }
        if self.rate_limit == Some(0) {
            return Err(Error::Config("-R must be at least 1".into()));
        }
        if self.periodic_stats == Some(0) {
            return Err(Error::Config("-S must be at least 1".into()));
        }
        Ok(())
    }

    /// Repeat count the feed loop actually runs. A configured duration takes
    /// over stopping the run, so the repeat count is inflated to keep the
    /// loop going until the timer fires.
    pub fn effective_repeat(&self) -> usize {
        if self.duration.is_some() {
            1 << 30
        } else {
            self.repeat
        }
    }
}
