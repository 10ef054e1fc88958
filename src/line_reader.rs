//! Sequential, peekable line reader used by the solution and project readers.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::WINDOWS_1252;

use crate::error::{ConvertError, io_error};

/// UTF-8 byte-order mark as it appears after decoding.
pub const BYTE_ORDER_MARK: char = '\u{feff}';

/// Reads one whitespace-stripped line at a time with a single line of
/// look-ahead.
///
/// Each line is decoded as UTF-8 when it is valid UTF-8 and as Windows-1252
/// otherwise. Visual Studio 2008 writes project files in Windows-1252 and
/// solution files in UTF-8 with a byte-order mark.
pub struct LineReader<S: BufRead> {
    stream: S,
    pending: Option<String>,
    line_no: usize,
}

impl LineReader<BufReader<File>> {
    /// Open `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<S: BufRead> LineReader<S> {
    pub fn new(stream: S) -> Self {
        Self { stream, pending: None, line_no: 0 }
    }

    /// Return the next line with surrounding whitespace stripped, or `None`
    /// at end of input.
    ///
    /// With `look_ahead` set the line is returned but stays pending, so the
    /// next call returns it again.
    pub fn read_line(&mut self, look_ahead: bool) -> Result<Option<String>, ConvertError> {
        let line = match self.pending.take() {
            Some(line) => Some(line),
            None => self.next_line()?,
        };
        if look_ahead {
            self.pending.clone_from(&line);
        }
        Ok(line)
    }

    /// Number of physical lines consumed from the stream so far.
    pub fn line_number(&self) -> usize {
        self.line_no
    }

    /// Release the underlying handle.
    pub fn close(self) {}

    fn next_line(&mut self) -> Result<Option<String>, ConvertError> {
        let mut buffer = Vec::new();
        if self.stream.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let line = match std::str::from_utf8(&buffer) {
            Ok(line) => Cow::Borrowed(line),
            Err(_) => WINDOWS_1252.decode_without_bom_handling(&buffer).0,
        };
        Ok(Some(line.trim().to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
