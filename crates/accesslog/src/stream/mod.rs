//! Stream module: line reading, the parse loop, and record sinks.

pub mod reader;
pub mod driver;
pub mod sink;

pub use driver::{NoMatchPolicy, RunError, RunSummary, StreamDriver};
pub use reader::{LineReader, RawLine};
pub use sink::{JsonLinesSink, OutputFormat, OutputSink, RecordSink, SinkError, TextSink};
