//! Stream-backed implementations of the engine's I/O collaborators.

use slate_vm::{Input, Output};
use std::io::{BufRead, Write};

/// Line-oriented input reader: one token per line.
///
/// Integers are optionally signed decimal; booleans compare
/// case-insensitively against `true`; strings are the line itself with the
/// trailing newline stripped. A malformed integer line and end of input
/// both read as `None`, which READ stores as `nil`.
pub struct LineInput<R: BufRead> {
    reader: R,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

impl<R: BufRead> Input for LineInput<R> {
    fn read_int(&mut self) -> Option<i64> {
        self.next_line().and_then(|line| line.trim().parse().ok())
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.next_line()
            .map(|line| line.trim().eq_ignore_ascii_case("true"))
    }

    fn read_string(&mut self) -> Option<String> {
        self.next_line()
    }
}

/// Unbuffered pass-through writer.
///
/// Write failures are remembered rather than raised, so the interpreter's
/// own error taxonomy stays clean; the caller checks [`failed`] after the
/// run and maps it to the output-error exit code.
///
/// [`failed`]: StreamOutput::failed
pub struct StreamOutput<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> StreamOutput<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    /// Whether any write has failed so far.
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl<W: Write> Output for StreamOutput<W> {
    fn write_str(&mut self, text: &str) {
        if self.writer.write_all(text.as_bytes()).is_err() || self.writer.flush().is_err() {
            self.failed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn input(text: &str) -> LineInput<Cursor<Vec<u8>>> {
        LineInput::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn reads_ints_per_line() {
        let mut reader = input("42\n-7\n");
        assert_eq!(reader.read_int(), Some(42));
        assert_eq!(reader.read_int(), Some(-7));
        assert_eq!(reader.read_int(), None);
    }

    #[test]
    fn malformed_int_reads_as_none() {
        let mut reader = input("4x\n5\n");
        assert_eq!(reader.read_int(), None);
        assert_eq!(reader.read_int(), Some(5));
    }

    #[test]
    fn bools_compare_case_insensitively() {
        let mut reader = input("TRUE\ntrue\nyes\n");
        assert_eq!(reader.read_bool(), Some(true));
        assert_eq!(reader.read_bool(), Some(true));
        assert_eq!(reader.read_bool(), Some(false));
        assert_eq!(reader.read_bool(), None);
    }

    #[test]
    fn strings_keep_inner_whitespace() {
        let mut reader = input("hello world\r\nlast");
        assert_eq!(reader.read_string(), Some("hello world".to_string()));
        assert_eq!(reader.read_string(), Some("last".to_string()));
        assert_eq!(reader.read_string(), None);
    }

    #[test]
    fn output_collects_writes() {
        let mut out = StreamOutput::new(Vec::new());
        out.write_str("a");
        out.write_str("b");
        assert!(!out.failed());
        assert_eq!(out.writer, b"ab");
    }
}
