//! Driver: pulls lines, parses them, forwards records, keeps the count.
//!
//! The counters live in a [`RunClock`] owned by one `run` call. The clock is
//! a drop guard: the run summary is logged when it goes out of scope, so it
//! is reported on every exit path, including read and sink failures.

use std::io::{self, BufRead};
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::parser::{LogParser, ParseFailure, MAX_LINE_SIZE};
use super::reader::{LineReader, RawLine};
use super::sink::{RecordSink, SinkError};

/// What to do with a line that produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoMatchPolicy {
    /// Count it, report it, keep going
    #[default]
    Skip,
    /// Stop the run at the first rejected line
    Abort,
}

impl NoMatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoMatchPolicy::Skip => "skip",
            NoMatchPolicy::Abort => "abort",
        }
    }
}

impl std::str::FromStr for NoMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(NoMatchPolicy::Skip),
            "abort" => Ok(NoMatchPolicy::Abort),
            other => Err(format!("unknown no-match policy '{}' (expected skip or abort)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Wall-clock time the run started
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// Every line read, parsed or not
    pub total_lines: u64,
    pub parsed: u64,
    pub rejected: u64,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to read input after {} lines: {source}", .summary.total_lines)]
    Read {
        source: io::Error,
        summary: RunSummary,
    },

    #[error("Sink failed after {} lines: {source}", .summary.total_lines)]
    Sink {
        source: SinkError,
        summary: RunSummary,
    },

    #[error("Aborted at line {line_number}: {failure}")]
    Aborted {
        line_number: u64,
        failure: ParseFailure,
        summary: RunSummary,
    },
}

impl RunError {
    /// Accounting up to the point the run stopped.
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunError::Read { summary, .. }
            | RunError::Sink { summary, .. }
            | RunError::Aborted { summary, .. } => summary,
        }
    }
}

/// Why the read loop stopped early.
enum Halt {
    Read(io::Error),
    Sink(SinkError),
    Aborted { line_number: u64, failure: ParseFailure },
}

impl Halt {
    fn into_error(self, summary: RunSummary) -> RunError {
        match self {
            Halt::Read(source) => RunError::Read { source, summary },
            Halt::Sink(source) => RunError::Sink { source, summary },
            Halt::Aborted { line_number, failure } => RunError::Aborted {
                line_number,
                failure,
                summary,
            },
        }
    }
}

/// Per-run accounting; logs the summary when dropped.
struct RunClock {
    started: Instant,
    started_at: DateTime<Utc>,
    total_lines: u64,
    parsed: u64,
    rejected: u64,
}

impl RunClock {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            total_lines: 0,
            parsed: 0,
            rejected: 0,
        }
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            started_at: self.started_at,
            elapsed: self.started.elapsed(),
            total_lines: self.total_lines,
            parsed: self.parsed,
            rejected: self.rejected,
        }
    }
}

impl Drop for RunClock {
    fn drop(&mut self) {
        let summary = self.summary();
        info!(
            total_lines = summary.total_lines,
            parsed = summary.parsed,
            rejected = summary.rejected,
            "Elapsed time: {:?}, total count: {}",
            summary.elapsed,
            summary.total_lines
        );
    }
}

/// Sequential line-to-record pipeline over one input stream.
pub struct StreamDriver<P> {
    parser: P,
    on_no_match: NoMatchPolicy,
    max_line_bytes: usize,
}

impl<P: LogParser> StreamDriver<P> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            on_no_match: NoMatchPolicy::default(),
            max_line_bytes: MAX_LINE_SIZE,
        }
    }

    pub fn on_no_match(mut self, policy: NoMatchPolicy) -> Self {
        self.on_no_match = policy;
        self
    }

    pub fn max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// Stream `input` line by line into `sink`.
    ///
    /// Lines are processed strictly in order and exactly once. Rejected lines
    /// are handled per the [`NoMatchPolicy`]; a read or sink error ends the run.
    /// The sink is flushed on every exit path.
    pub fn run<R, S>(&self, input: R, sink: &mut S) -> Result<RunSummary, RunError>
    where
        R: BufRead,
        S: RecordSink + ?Sized,
    {
        let mut clock = RunClock::start();
        debug!(
            on_no_match = self.on_no_match.as_str(),
            max_line_bytes = self.max_line_bytes,
            "Starting run"
        );

        let lines = LineReader::new(input, self.max_line_bytes);
        let outcome = self.drive(lines, sink, &mut clock);
        let flushed = sink.flush();

        match (outcome, flushed) {
            (Ok(()), Ok(())) => Ok(clock.summary()),
            (Ok(()), Err(source)) => Err(RunError::Sink {
                source,
                summary: clock.summary(),
            }),
            (Err(halt), flushed) => {
                if let Err(e) = flushed {
                    warn!(error = %e, "Sink flush failed after the run stopped");
                }
                Err(halt.into_error(clock.summary()))
            }
        }
    }

    fn drive<R, S>(
        &self,
        lines: LineReader<R>,
        sink: &mut S,
        clock: &mut RunClock,
    ) -> Result<(), Halt>
    where
        R: BufRead,
        S: RecordSink + ?Sized,
    {
        for line in lines {
            let line = line.map_err(Halt::Read)?;
            clock.total_lines += 1;
            let line_number = clock.total_lines;

            let parsed = match line {
                RawLine::Text(text) => self.parser.parse(&text),
                RawLine::TooLarge(prefix) => Err(ParseFailure::line_too_large(prefix)),
            };

            match parsed {
                Ok(record) => {
                    clock.parsed += 1;
                    sink.accept(record).map_err(Halt::Sink)?;
                }
                Err(failure) => {
                    clock.rejected += 1;
                    warn!(
                        line_number,
                        reason = failure.reason.as_str(),
                        "Line {} rejected",
                        line_number
                    );
                    sink.reject(line_number, &failure).map_err(Halt::Sink)?;
                    if self.on_no_match == NoMatchPolicy::Abort {
                        return Err(Halt::Aborted { line_number, failure });
                    }
                }
            }
        }
        Ok(())
    }
}
