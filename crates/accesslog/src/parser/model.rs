use thiserror::Error;
use serde::{Serialize, Deserialize};

/// Record field names in grammar order.
///
/// Every name is also the name of exactly one capture group in the
/// access log pattern (see [`super::grammar`]).
pub const FIELD_NAMES: [&str; 11] = [
    "remote_addr",
    "remote_user",
    "timestamp",
    "method",
    "url",
    "http_version",
    "status",
    "body_bytes_sent",
    "http_referer",
    "http_user_agent",
    "http_x_forwarded_for",
];

/// One decoded access log line.
///
/// All fields are always present. A field whose capture group did not
/// participate in the match is empty, and the two numeric fields fall back
/// to `0` when their token is not a valid integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Client address token
    pub remote_addr: String,

    /// Authenticated user, `-` when absent
    pub remote_user: String,

    /// Raw contents of the `[...]` token, not parsed into a date
    pub timestamp: String,

    /// HTTP method; may be empty or `-` for malformed request lines
    pub method: String,

    /// Request target, escaped quotes kept verbatim
    pub url: String,

    /// Protocol token, e.g. `HTTP/1.1`
    pub http_version: String,

    pub status: i64,
    pub body_bytes_sent: i64,

    pub http_referer: String,
    pub http_user_agent: String,

    /// Final quoted field; runs to the end of the line
    pub http_x_forwarded_for: String,
}

/// Longest prefix of a failing line shown in error messages.
pub const PREVIEW_CHARS: usize = 120;

/// A single field value as seen by sinks that render listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
}

impl std::fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
        }
    }
}

impl Record {
    /// (field-name, value) pairs in grammar order.
    pub fn fields(&self) -> [(&'static str, FieldValue<'_>); 11] {
        [
            (FIELD_NAMES[0], FieldValue::Text(&self.remote_addr)),
            (FIELD_NAMES[1], FieldValue::Text(&self.remote_user)),
            (FIELD_NAMES[2], FieldValue::Text(&self.timestamp)),
            (FIELD_NAMES[3], FieldValue::Text(&self.method)),
            (FIELD_NAMES[4], FieldValue::Text(&self.url)),
            (FIELD_NAMES[5], FieldValue::Text(&self.http_version)),
            (FIELD_NAMES[6], FieldValue::Int(self.status)),
            (FIELD_NAMES[7], FieldValue::Int(self.body_bytes_sent)),
            (FIELD_NAMES[8], FieldValue::Text(&self.http_referer)),
            (FIELD_NAMES[9], FieldValue::Text(&self.http_user_agent)),
            (FIELD_NAMES[10], FieldValue::Text(&self.http_x_forwarded_for)),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The line does not conform to the access log grammar at all
    NoMatch,
    /// The line exceeded the configured byte limit and was cut short
    LineTooLarge,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::NoMatch => "no_match",
            FailureReason::LineTooLarge => "line_too_large",
        }
    }
}

/// A line that could not be turned into a [`Record`].
///
/// `line` holds the raw input (for `LineTooLarge`, only the retained prefix).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {:?}", .reason.as_str(), self.preview())]
pub struct ParseFailure {
    pub reason: FailureReason,
    pub line: String,
}

impl ParseFailure {
    pub fn no_match(line: &str) -> Self {
        Self {
            reason: FailureReason::NoMatch,
            line: line.to_string(),
        }
    }

    pub fn line_too_large(prefix: String) -> Self {
        Self {
            reason: FailureReason::LineTooLarge,
            line: prefix,
        }
    }

    /// The line cut to [`PREVIEW_CHARS`] characters, `...` marking a cut.
    pub fn preview(&self) -> String {
        match self.line.char_indices().nth(PREVIEW_CHARS) {
            Some((end, _)) => format!("{}...", &self.line[..end]),
            None => self.line.clone(),
        }
    }
}
