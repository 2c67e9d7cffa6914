use regex::{Captures, Regex};

use crate::parser::grammar;
use crate::parser::traits::{LogParser, ParseFailure, Record};

/// Parser for nginx/Apache combined access logs with a trailing
/// `X-Forwarded-For` field.
///
/// Holds the compiled grammar; build it once and reuse it for every line.
/// Extracts remote address, user, timestamp, method, url, protocol, status,
/// body size, referer, user-agent and forwarded-for.
#[derive(Debug, Clone)]
pub struct AccessLogParser {
    pattern: Regex,
}

impl AccessLogParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: grammar::compile()?,
        })
    }
}

impl LogParser for AccessLogParser {
    fn parse(&self, line: &str) -> Result<Record, ParseFailure> {
        // Format: addr ident user [date] "request" status bytes "referer" "user-agent" "xff"
        // Example: 127.0.0.1 - frank [10/Oct/2023:13:55:36 +0000] "GET /apache_pb.gif HTTP/1.1" 200 2326 "-" "Mozilla/4.08" "-"
        let caps = self
            .pattern
            .captures(line)
            .ok_or_else(|| ParseFailure::no_match(line))?;

        Ok(Record {
            remote_addr: text(&caps, "remote_addr"),
            remote_user: text(&caps, "remote_user"),
            timestamp: text(&caps, "timestamp"),
            method: text(&caps, "method"),
            url: text(&caps, "url"),
            http_version: text(&caps, "http_version"),
            status: coerce_int(&caps, "status"),
            body_bytes_sent: coerce_int(&caps, "body_bytes_sent"),
            http_referer: text(&caps, "http_referer"),
            http_user_agent: text(&caps, "http_user_agent"),
            http_x_forwarded_for: text(&caps, "http_x_forwarded_for"),
        })
    }
}

/// Captured text of a named group, empty when the group did not participate.
fn text(caps: &Captures<'_>, name: &str) -> String {
    caps.name(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Decimal value of a named group.
///
/// Non-numeric, empty and overflowing tokens all yield 0. This fallback is
/// silent on purpose: a bad numeric token never costs the rest of the line.
fn coerce_int(caps: &Captures<'_>, name: &str) -> i64 {
    caps.name(name)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}
