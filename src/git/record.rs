use std::io::BufRead;

use crate::error::RoastError;

/// Streaming scanner over delimiter-separated records.
///
/// Splits the input on `record_sep` and each record on `field_sep`, holding at
/// most one record in memory at a time. A final record without a trailing
/// separator is treated as complete when the stream ends. Record edges are
/// trimmed (git pads records with newlines); a whitespace-only record yields
/// an empty field list so callers can skip it. The only error is stream I/O;
/// malformed content is the caller's problem, by contract.
pub struct RecordScanner<R> {
    reader: R,
    record_sep: u8,
    field_sep: u8,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> RecordScanner<R> {
    pub fn new(reader: R, record_sep: u8, field_sep: u8) -> Self {
        RecordScanner {
            reader,
            record_sep,
            field_sep,
            buf: Vec::with_capacity(256),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for RecordScanner<R> {
    type Item = Result<Vec<String>, RoastError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buf.clear();
        match self.reader.read_until(self.record_sep, &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                if self.buf.last() == Some(&self.record_sep) {
                    self.buf.pop();
                } else {
                    // EOF without a trailing separator: the record is still
                    // complete, and the stream is exhausted.
                    self.done = true;
                }
                let text = String::from_utf8_lossy(&self.buf);
                let record = text.trim();
                if record.is_empty() {
                    return Some(Ok(Vec::new()));
                }
                let fields = record
                    .split(self.field_sep as char)
                    .map(str::to_string)
                    .collect();
                Some(Ok(fields))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RS: u8 = 0x1e;
    const FS: u8 = 0x1f;

    fn scan(input: &str) -> Vec<Vec<String>> {
        RecordScanner::new(Cursor::new(input.as_bytes().to_vec()), RS, FS)
            .map(|r| r.expect("no io error on in-memory input"))
            .collect()
    }

    #[test]
    fn test_splits_records_and_fields() {
        let input = "a\x1fb\x1fc\x1e\nd\x1fe\x1ff\x1e";
        let records = scan(input);
        assert_eq!(records.len(), 2, "two records expected");
        assert_eq!(records[0], vec!["a", "b", "c"]);
        assert_eq!(records[1], vec!["d", "e", "f"]);
    }

    #[test]
    fn test_final_record_without_trailing_separator() {
        let input = "a\x1fb\x1e\nc\x1fd";
        let records = scan(input);
        assert_eq!(records.len(), 2, "trailing record must be kept");
        assert_eq!(records[1], vec!["c", "d"]);
    }

    #[test]
    fn test_whitespace_only_record_yields_no_fields() {
        let input = "a\x1e\n  \n\x1eb\x1e";
        let records = scan(input);
        assert_eq!(records.len(), 3);
        assert!(records[1].is_empty(), "blank record should have no fields");
        assert_eq!(records[2], vec!["b"]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(scan("").is_empty(), "empty stream should produce no records");
    }

    #[test]
    fn test_empty_interior_fields_preserved() {
        let input = "a\x1f\x1fc\x1e";
        let records = scan(input);
        assert_eq!(records[0], vec!["a", "", "c"], "empty fields are positional");
    }
}
