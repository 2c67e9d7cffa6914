//! Access log parsing
//!
//! Turns one raw access log line into a structured [`Record`].
//!
//! # Architecture
//!
//! - `grammar.rs`: the line pattern, one named capture group per field
//! - `model.rs`: `Record`, field names, `ParseFailure`
//! - `traits.rs`: the `LogParser` seam used by the stream driver
//! - `access_log.rs`: the parser implementation and numeric coercion
//!
//! # Guarantees
//!
//! - The pattern is compiled once per parser, never per line
//! - Parsing is pure: same line, same record
//! - A bad status or byte count never fails the line (it becomes `0`)

pub mod traits;
pub mod grammar;
pub mod model;
pub mod access_log;

// Re-export commonly used types
pub use traits::LogParser;
pub use access_log::AccessLogParser;
pub use model::{FailureReason, FieldValue, ParseFailure, Record, FIELD_NAMES};

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
