//! SAM text parsing
//!
//! Streams segments out of SAM text one byte at a time. The parser never
//! rejects a record: short lines leave the remaining fields at their
//! defaults, overlong fields are truncated and unparsable numbers become 0.

use crate::cigar::leading_int;
use crate::segment::Segment;
use std::io::{BufRead, Error as IoError, ErrorKind};

/// Bytes kept per field before the rest of the field is dropped
pub const DEFAULT_FIELD_CAPACITY: usize = 512;

#[derive(Debug)]
pub enum ParseErr {
    IoError(IoError),
}

impl std::fmt::Display for ParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErr::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ParseErr {}

impl From<IoError> for ParseErr {
    fn from(e: IoError) -> Self {
        ParseErr::IoError(e)
    }
}

/// Streaming reader producing `(qname, segment)` pairs from SAM text
pub struct SamReader<R: BufRead> {
    inner: R,
    field_capacity: usize,
    records_read: u64,
}

impl<R: BufRead> SamReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            field_capacity: DEFAULT_FIELD_CAPACITY,
            records_read: 0,
        }
    }

    pub fn with_field_capacity(mut self, field_capacity: usize) -> Self {
        self.field_capacity = field_capacity;
        self
    }

    /// Number of records returned so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, IoError> {
        loop {
            match self.inner.fill_buf() {
                Ok(buffer) => return Ok(buffer.first().copied()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>, IoError> {
        let byte = self.peek_byte()?;
        if byte.is_some() {
            self.inner.consume(1);
        }
        Ok(byte)
    }

    /// Consume the rest of the current line. Returns false if the stream
    /// ended before a newline.
    fn skip_line(&mut self) -> Result<bool, IoError> {
        loop {
            let (used, found) = {
                let buffer = match self.inner.fill_buf() {
                    Ok(buffer) => buffer,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if buffer.is_empty() {
                    return Ok(false);
                }
                match buffer.iter().position(|&b| b == b'\n') {
                    Some(index) => (index + 1, true),
                    None => (buffer.len(), false),
                }
            };
            self.inner.consume(used);
            if found {
                return Ok(found);
            }
        }
    }

    /// Read the next segment, skipping header and blank lines.
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn next_segment(&mut self) -> Result<Option<(String, Segment)>, ParseErr> {
        loop {
            let Some(first) = self.next_byte()? else {
                return Ok(None);
            };
            match first {
                b'@' => {
                    if !self.skip_line()? {
                        return Ok(None);
                    }
                }
                b'\n' => continue,
                // CRLF blank line, or a lone carriage return at the end
                b'\r' if matches!(self.peek_byte()?, Some(b'\n') | None) => {
                    self.next_byte()?;
                }
                _ => {
                    let record = self.read_record(first)?;
                    self.records_read += 1;
                    return Ok(Some(record));
                }
            }
        }
    }

    fn read_record(&mut self, first: u8) -> Result<(String, Segment), ParseErr> {
        let mut qname = String::new();
        let mut segment = Segment::default();

        let mut field: Vec<u8> = Vec::with_capacity(64);
        let mut field_index = 0;
        let mut next = Some(first);

        while let Some(byte) = next {
            match byte {
                b'\n' => break,
                b'\t' => {
                    assign_field(&mut qname, &mut segment, field_index, &field);
                    field_index += 1;
                    field.clear();
                }
                _ if field.len() < self.field_capacity => field.push(byte),
                _ => {}
            }
            next = self.next_byte()?;
        }

        // The last column ends at a newline or at end of stream
        if field.last() == Some(&b'\r') {
            field.pop();
        }
        assign_field(&mut qname, &mut segment, field_index, &field);

        segment.compute_derived();
        Ok((qname, segment))
    }
}

impl<R: BufRead> Iterator for SamReader<R> {
    type Item = Result<(String, Segment), ParseErr>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_segment().transpose()
    }
}

fn assign_field(qname: &mut String, segment: &mut Segment, index: usize, field: &[u8]) {
    let text = || String::from_utf8_lossy(field).into_owned();
    match index {
        0 => *qname = text(),
        1 => segment.flag = leading_int(field) as u16,
        2 => segment.rname = text(),
        3 => segment.pos = leading_int(field) as i32,
        4 => segment.mapq = leading_int(field) as u16,
        5 => segment.cigar = text(),
        6 => segment.rnext = text(),
        7 => segment.pnext = leading_int(field) as i32,
        8 => segment.tlen = leading_int(field) as i32,
        9 => segment.seq = text(),
        10 => segment.qual = text(),
        // Optional tag columns are ignored
        _ => {}
    }
}
