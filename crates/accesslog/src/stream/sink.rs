//! Sink: consumers of parsed records.

use std::io::{self, Write};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::{FieldValue, ParseFailure, Record};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Write failed: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receives every record the driver produces, in line order.
///
/// An error from any method stops the run.
pub trait RecordSink {
    fn accept(&mut self, record: Record) -> Result<(), SinkError>;

    /// Called for each line that did not produce a record
    fn reject(&mut self, _line_number: u64, _failure: &ParseFailure) -> Result<(), SinkError> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<F> RecordSink for F
where
    F: FnMut(Record),
{
    fn accept(&mut self, record: Record) -> Result<(), SinkError> {
        self(record);
        Ok(())
    }
}

/// One JSON object per line.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn accept(&mut self, record: Record) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// One `field=value` listing per line, fields in grammar order.
///
/// Values that are empty or contain whitespace, `"`, `=` or `\` are quoted,
/// with `"` and `\` escaped.
pub struct TextSink<W> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for TextSink<W> {
    fn accept(&mut self, record: Record) -> Result<(), SinkError> {
        let mut line = String::with_capacity(256);
        for (i, (name, value)) in record.fields().iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(name);
            line.push('=');
            match value {
                FieldValue::Int(n) => line.push_str(&n.to_string()),
                FieldValue::Text(s) => push_text(&mut line, s),
            }
        }
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

fn push_text(line: &mut String, value: &str) {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '=' || c == '\\');
    if !needs_quotes {
        line.push_str(value);
        return;
    }
    line.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            line.push('\\');
        }
        line.push(c);
    }
    line.push('"');
}

/// Record rendering selectable at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "logfmt" => Ok(OutputFormat::Text),
            other => Err(format!("unknown output format '{}' (expected json or text)", other)),
        }
    }
}

/// Sink chosen by [`OutputFormat`].
pub enum OutputSink<W> {
    Json(JsonLinesSink<W>),
    Text(TextSink<W>),
}

impl<W: Write> OutputSink<W> {
    pub fn new(format: OutputFormat, writer: W) -> Self {
        match format {
            OutputFormat::Json => OutputSink::Json(JsonLinesSink::new(writer)),
            OutputFormat::Text => OutputSink::Text(TextSink::new(writer)),
        }
    }
}

impl<W: Write> RecordSink for OutputSink<W> {
    fn accept(&mut self, record: Record) -> Result<(), SinkError> {
        match self {
            OutputSink::Json(sink) => sink.accept(record),
            OutputSink::Text(sink) => sink.accept(record),
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        match self {
            OutputSink::Json(sink) => sink.flush(),
            OutputSink::Text(sink) => sink.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            remote_addr: "127.0.0.1".to_string(),
            remote_user: "frank".to_string(),
            timestamp: "10/Oct/2023:13:55:36 +0000".to_string(),
            method: "GET".to_string(),
            url: "/a\\\"b".to_string(),
            http_version: "HTTP/1.1".to_string(),
            status: 200,
            body_bytes_sent: 2326,
            http_referer: "-".to_string(),
            http_user_agent: "Mozilla/4.08".to_string(),
            http_x_forwarded_for: String::new(),
        }
    }

    /// Writer that refuses every write.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    // ── JSON ────────────────────────────────────────────────────

    #[test]
    fn test_json_sink_writes_one_object_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.accept(sample()).unwrap();
        sink.accept(Record::default()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Record = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, sample());
    }

    #[test]
    fn test_json_sink_surfaces_write_errors() {
        let mut sink = JsonLinesSink::new(Closed);
        assert!(sink.accept(sample()).is_err());
    }

    // ── Text ────────────────────────────────────────────────────

    #[test]
    fn test_text_sink_listing() {
        let mut sink = TextSink::new(Vec::new());
        sink.accept(sample()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "remote_addr=127.0.0.1 remote_user=frank timestamp=\"10/Oct/2023:13:55:36 +0000\" \
             method=GET url=\"/a\\\\\\\"b\" http_version=HTTP/1.1 status=200 body_bytes_sent=2326 \
             http_referer=- http_user_agent=Mozilla/4.08 http_x_forwarded_for=\"\"\n"
        );
    }

    #[test]
    fn test_text_sink_surfaces_write_errors() {
        let mut sink = TextSink::new(Closed);
        assert!(matches!(sink.accept(sample()), Err(SinkError::Io(_))));
    }

    // ── Closures & selection ────────────────────────────────────

    #[test]
    fn test_closure_sink_receives_records() {
        let mut seen = Vec::new();
        {
            let mut sink = |r: Record| seen.push(r);
            sink.accept(sample()).unwrap();
            sink.reject(1, &ParseFailure::no_match("x")).unwrap();
            sink.flush().unwrap();
        }
        assert_eq!(seen, vec![sample()]);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("logfmt".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_sink_dispatches_on_format() {
        let mut sink = OutputSink::new(OutputFormat::Text, Vec::new());
        sink.accept(Record::default()).unwrap();
        match sink {
            OutputSink::Text(text) => {
                let out = String::from_utf8(text.into_inner()).unwrap();
                assert!(out.starts_with("remote_addr=\"\" "));
            }
            OutputSink::Json(_) => panic!("expected text sink"),
        }
    }
}
