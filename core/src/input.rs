//! Input sources and the feeder loop
//!
//! The feeder runs on a blocking thread and pushes inputs into the worker
//! channel. Inline commands take precedence over `-` (stdin), which takes
//! precedence over a named file; every source except stdin can be re-read
//! for `-r N`.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::config::HarnessCli;
use crate::error::{Error, Result};
use crate::signal::StopFlag;

/// One unit of work handed to a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientInput {
    /// A raw command line (command mode)
    Cmd(String),
    /// One row of template arguments (template mode)
    Args(Vec<String>),
}

/// Where commands come from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Commands given on the command line, joined by newlines
    Inline(String),
    /// Standard input; cannot be repeated
    Stdin,
    /// A named input file, re-opened for every repeat iteration
    File(PathBuf),
}

impl InputSource {
    /// Pick the input source from the parsed flags
    pub fn from_cli(cli: &HarnessCli) -> Result<InputSource> {
        if !cli.commands.is_empty() {
            return Ok(InputSource::Inline(cli.commands.join("\n") + "\n"));
        }
        match cli.file.as_deref() {
            Some("-") => Ok(InputSource::Stdin),
            Some(path) => Ok(InputSource::File(PathBuf::from(path))),
            None => Err(Error::Config(
                "either 'command line' commands or -f filename must be given".into(),
            )),
        }
    }

    fn open(&self) -> Result<Box<dyn BufRead + Send>> {
        match self {
            InputSource::Inline(text) => Ok(Box::new(Cursor::new(text.clone()))),
            InputSource::Stdin => Ok(Box::new(BufReader::new(std::io::stdin()))),
            InputSource::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
        }
    }
}

/// Feeds the input channel until the source runs dry, the repeat count is
/// exhausted or the stop flag is raised
pub(crate) struct Feeder {
    source: InputSource,
    template_mode: bool,
    repeat: usize,
    stop: StopFlag,
    tx: mpsc::Sender<ClientInput>,
}

impl Feeder {
    pub fn new(
        source: InputSource,
        template_mode: bool,
        repeat: usize,
        stop: StopFlag,
        tx: mpsc::Sender<ClientInput>,
    ) -> Self {
        Self {
            source,
            template_mode,
            repeat,
            stop,
            tx,
        }
    }

    /// Run the feed loop to completion. Blocking; run on a blocking thread.
    ///
    /// Dropping `self` afterwards closes the input channel, which is what
    /// tells the workers to drain and terminate.
    pub fn feed(self) -> Result<()> {
        for iteration in 0..self.repeat {
            if self.stop.is_set() {
                break;
            }
            tracing::debug!(iteration, "feeding input");
            let reader = self.source.open()?;
            if self.template_mode {
                self.feed_rows(reader)?;
            } else {
                self.feed_lines(reader)?;
            }
        }
        Ok(())
    }

    /// Command mode: one input per newline-terminated line. The trailing
    /// newline is stripped, blank lines pass through, and an unterminated
    /// final line is treated as EOF.
    fn feed_lines(&self, mut reader: Box<dyn BufRead + Send>) -> Result<()> {
        let mut line = String::new();
        while !self.stop.is_set() {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            if line.pop() != Some('\n') {
                break;
            }
            if self
                .tx
                .blocking_send(ClientInput::Cmd(std::mem::take(&mut line)))
                .is_err()
            {
                break;
            }
        }
        Ok(())
    }

    /// Template mode: one input per tab-separated row, with csv quoting
    fn feed_rows(&self, reader: Box<dyn BufRead + Send>) -> Result<()> {
        let mut rows = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_reader(reader);
        for row in rows.records() {
            if self.stop.is_set() {
                break;
            }
            let row = row?;
            let args: Vec<String> = row.iter().map(str::to_owned).collect();
            tracing::debug!(?args, "sending row");
            if self.tx.blocking_send(ClientInput::Args(args)).is_err() {
                break;
            }
        }
        Ok(())
    }
}
