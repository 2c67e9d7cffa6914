//! Ingest: run the stream driver over the configured input.

use std::io::{self, BufWriter};
use thiserror::Error;

use crate::conf::IngestConfig;
use crate::parser::AccessLogParser;
use crate::runtime::boot::{self, BootError};
use crate::stream::{OutputSink, RunError, RunSummary, StreamDriver};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to compile access log pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Boot(#[from] BootError),

    #[error(transparent)]
    Run(#[from] RunError),
}

/// Stream the configured input to stdout in the configured format.
pub fn ingest(config: &IngestConfig) -> Result<RunSummary, IngestError> {
    let path = config
        .path
        .as_deref()
        .ok_or_else(|| IngestError::Config("path is required".to_string()))?;

    let driver = StreamDriver::new(AccessLogParser::new()?)
        .on_no_match(config.on_no_match)
        .max_line_bytes(config.max_line_bytes);
    let input = boot::open_input(path)?;

    let stdout = io::stdout();
    let mut sink = OutputSink::new(config.output, BufWriter::new(stdout.lock()));
    Ok(driver.run(input, &mut sink)?)
}
