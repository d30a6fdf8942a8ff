//! Separator-delimited log encoding
//!
//! [`LogScanner`] reads a log incrementally and yields one [`LogChunk`] per
//! record. The final chunk is yielded even if it is not followed by a
//! separator. Nothing is yielded for the empty remainder after a trailing
//! separator. Any other chunk is yielded as is, blank or not, and
//! [`decode_chunk`] rejects the blank ones.

use super::{Record, SEPARATOR};
use crate::error::{MockError, Result};
use std::io::{BufRead, BufReader, Read};

const READ_SIZE: usize = 8 * 1024;

/// Serialize a record followed by the separator
pub fn encode_record(record: &Record) -> std::result::Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(record)?;
    text.push_str(SEPARATOR);
    Ok(text)
}

/// One separator-delimited piece of a log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogChunk {
    /// 0-based position of the chunk in the log
    pub index: usize,
    /// Byte offset of the chunk's first byte
    pub offset: usize,
    /// Chunk contents without the separator
    pub text: String,
}

/// Decode one chunk into a record
pub fn decode_chunk(chunk: &LogChunk) -> Result<Record> {
    let parse_error = |reason: String| MockError::Parse {
        chunk: chunk.index,
        offset: chunk.offset,
        reason,
    };

    if chunk.text.trim().is_empty() {
        return Err(parse_error("empty record".to_string()));
    }

    let record: Record =
        serde_json::from_str(&chunk.text).map_err(|e| parse_error(e.to_string()))?;

    if record.service.is_empty() || record.method.is_empty() {
        return Err(parse_error("record has an empty service or method".to_string()));
    }
    Ok(record)
}

/// Decode every record in a log. The first bad chunk fails the whole read.
pub fn read_log<R: Read>(reader: R) -> Result<Vec<Record>> {
    LogScanner::new(BufReader::new(reader))
        .map(|chunk| chunk.and_then(|c| decode_chunk(&c)))
        .collect()
}

/// Incremental splitter over a separator-delimited log
pub struct LogScanner<R> {
    reader: R,
    buf: Vec<u8>,
    /// Position in `buf` up to which no separator starts
    searched: usize,
    /// Log offset of `buf[0]`
    base_offset: usize,
    index: usize,
    eof: bool,
}

impl<R: BufRead> LogScanner<R> {
    /// Scan the given reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            searched: 0,
            base_offset: 0,
            index: 0,
            eof: false,
        }
    }

    fn find_separator(&mut self) -> Option<usize> {
        let sep = SEPARATOR.as_bytes();
        if self.buf.len() < sep.len() {
            return None;
        }
        let found = self.buf[self.searched..]
            .windows(sep.len())
            .position(|w| w == sep)
            .map(|p| p + self.searched);
        if found.is_none() {
            self.searched = self.buf.len() + 1 - sep.len();
        }
        found
    }

    fn fill(&mut self) -> Result<()> {
        let mut tmp = [0u8; READ_SIZE];
        let n = self.reader.read(&mut tmp)?;
        if n == 0 {
            self.eof = true;
        } else {
            self.buf.extend_from_slice(&tmp[..n]);
        }
        Ok(())
    }

    /// Take `len` bytes off the front of the buffer and skip `skip` more
    fn take(&mut self, len: usize, skip: usize) -> Result<LogChunk> {
        let rest = self.buf.split_off(len + skip);
        let mut raw = std::mem::replace(&mut self.buf, rest);
        raw.truncate(len);
        if raw.last() == Some(&b'\r') {
            raw.pop();
        }

        let chunk_index = self.index;
        let offset = self.base_offset;
        self.index += 1;
        self.base_offset += len + skip;
        self.searched = 0;

        let text = String::from_utf8(raw).map_err(|e| MockError::Parse {
            chunk: chunk_index,
            offset,
            reason: e.to_string(),
        })?;
        Ok(LogChunk {
            index: chunk_index,
            offset,
            text,
        })
    }

    fn next_chunk(&mut self) -> Result<Option<LogChunk>> {
        loop {
            if let Some(at) = self.find_separator() {
                return self.take(at, SEPARATOR.len()).map(Some);
            }
            if self.eof {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                let len = self.buf.len();
                return self.take(len, 0).map(Some);
            }
            self.fill()?;
        }
    }
}

impl<R: BufRead> Iterator for LogScanner<R> {
    type Item = Result<LogChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk().transpose()
    }
}
