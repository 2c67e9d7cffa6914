//! Grammar: the access log line pattern.
//!
//! The pattern is assembled from an ordered table of segments. Each segment
//! that yields a [`Record`](super::model::Record) field captures it in a group
//! named after the field, so extraction never depends on group positions.
//!
//! ```text
//! addr - user [timestamp] "method url version" status bytes "referer" "agent" "xff"
//! ```
//!
//! Quoted fields use `(?:[^"]*(?:\\")?)*`: the longest run of non-quote
//! characters, optionally followed by one escaped quote, repeated. This is an
//! approximation of an escape-aware lexer, not a real one; the backslash is
//! kept in the captured text.

use regex::Regex;

/// Field separator. ASCII whitespace only, so a Unicode space such as
/// U+00A0 is part of a token rather than a break between tokens.
const WS: &str = r"[ \t\n\x0C\r]";

/// A single non-separator character.
const TOKEN: &str = r"[^ \t\n\x0C\r]";

/// `(segment name, regex fragment)` in line order.
///
/// Segment names that are not record fields (`ident`) use a non-capturing
/// fragment. The request line keeps `url` and its trailing separator in an
/// optional group so that `"-"` still matches. `{ws}` and `{tok}` stand for
/// [`WS`] and [`TOKEN`].
pub(super) const SEGMENTS: &[(&str, &str)] = &[
    ("remote_addr", r"(?P<remote_addr>{tok}+){ws}"),
    // ident, always "-" in practice
    ("ident", r"{tok}+{ws}"),
    ("remote_user", r"(?P<remote_user>{tok}+){ws}"),
    ("timestamp", r"\[(?P<timestamp>[^\]]+)\]{ws}"),
    ("method", r#""(?P<method>{tok}*){ws}?"#),
    ("url", r#"(?:(?P<url>(?:[^"]*(?:\\")?)*){ws})?"#),
    ("http_version", r#"(?P<http_version>[^"]*)"{ws}"#),
    ("status", r"(?P<status>{tok}+){ws}"),
    ("body_bytes_sent", r"(?P<body_bytes_sent>{tok}+){ws}"),
    ("http_referer", r#""(?P<http_referer>(?:[^"]*(?:\\")?)*)"{ws}"#),
    ("http_user_agent", r#""(?P<http_user_agent>(?:[^"]*(?:\\")?)*)"{ws}"#),
    ("http_x_forwarded_for", r#""(?P<http_x_forwarded_for>.*)""#),
];

/// Full pattern source, anchored to both ends of the line.
pub fn pattern_source() -> String {
    let mut source = String::from("^");
    for (_, fragment) in SEGMENTS {
        source.push_str(&fragment.replace("{ws}", WS).replace("{tok}", TOKEN));
    }
    source.push('$');
    source
}

/// Compile the access log pattern.
///
/// Callers compile once and reuse the result for every line.
pub fn compile() -> Result<Regex, regex::Error> {
    Regex::new(&pattern_source())
}
