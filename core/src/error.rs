//! Error types for cmdbench-core

use thiserror::Error;

/// Core error type
///
/// Everything fatal surfaces through this enum so binaries can map a failure
/// to its process exit code with [`Error::exit_code`].
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid flag combination or missing input source
    #[error("{0}")]
    Config(String),

    /// Input source could not be opened or read
    #[error("input error: {0}")]
    Io(#[from] std::io::Error),

    /// Input rows could not be parsed
    #[error("input error: {0}")]
    Parse(#[from] csv::Error),

    /// The executor factory refused to construct a client
    #[error("{0}")]
    Factory(anyhow::Error),

    /// A harness task panicked or was aborted
    #[error("{task} task failed: {source}")]
    Task {
        /// Which harness task died
        task: &'static str,
        /// The join error from the runtime
        source: tokio::task::JoinError,
    },
}

impl Error {
    /// Process exit code for this error: 2 for factory failures, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Factory(_) => 2,
            _ => 1,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
