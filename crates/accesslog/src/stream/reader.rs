//! Reader: bounded, lazy line source over any `BufRead`.
//!
//! Holds at most one line at a time. Lines longer than the limit are cut at
//! the limit and the rest of the line is discarded without being buffered.

use std::io::{self, BufRead, Read};

/// One line as read from the input, terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine {
    Text(String),
    /// Line exceeded the limit; holds the first `max_line_bytes` bytes
    TooLarge(String),
}

/// Iterator over the lines of a stream.
///
/// Finite and not restartable: after end of stream or the first I/O error
/// it yields `None` forever.
pub struct LineReader<R> {
    inner: R,
    max_line_bytes: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R, max_line_bytes: usize) -> Self {
        Self {
            inner,
            max_line_bytes,
            buf: Vec::new(),
            done: false,
        }
    }

    fn next_line(&mut self) -> io::Result<Option<RawLine>> {
        self.buf.clear();

        // limit + "\r\n"
        let window = self.max_line_bytes.saturating_add(2) as u64;
        let read = (&mut self.inner).take(window).read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }

        let terminated = self.buf.last() == Some(&b'\n');
        if !terminated && read as u64 == window {
            // cut mid-line: drop the remainder up to the next newline
            self.discard_through_newline()?;
            self.buf.truncate(self.max_line_bytes);
            return Ok(Some(RawLine::TooLarge(decode(&self.buf))));
        }

        if terminated {
            self.buf.pop();
        }
        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }

        if self.buf.len() > self.max_line_bytes {
            self.buf.truncate(self.max_line_bytes);
            return Ok(Some(RawLine::TooLarge(decode(&self.buf))));
        }
        Ok(Some(RawLine::Text(decode(&self.buf))))
    }

    fn discard_through_newline(&mut self) -> io::Result<()> {
        loop {
            let (found, used) = {
                let available = match self.inner.fill_buf() {
                    Ok(chunk) => chunk,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if available.is_empty() {
                    return Ok(());
                }
                match available.iter().position(|&b| b == b'\n') {
                    Some(i) => (true, i + 1),
                    None => (false, available.len()),
                }
            };
            self.inner.consume(used);
            if found {
                return Ok(());
            }
        }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<RawLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.next_line().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

/// Invalid UTF-8 is replaced, never rejected.
fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
