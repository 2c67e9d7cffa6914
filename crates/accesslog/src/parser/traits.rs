pub use super::model::{FailureReason, ParseFailure, Record};

pub trait LogParser {
    /// parse one raw line (no line terminator) into a record
    fn parse(&self, line: &str) -> Result<Record, ParseFailure>;
}
