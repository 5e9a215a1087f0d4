//! Body decoders
//!
//! A PLY body is a flat sequence of values whose types are only known from
//! the header, so decoding is driven one value at a time through [`Input`].
//! The ASCII decoder pulls whitespace-separated tokens; the binary decoder
//! keeps its own byte buffer over the raw channel and has to find the end of
//! the header by itself, since the header length in bytes is not recorded
//! anywhere in the file.

use super::header::{read_header_line, END_HEADER};
use super::types::{Number, ScalarType, MAX_SCALAR_WIDTH};
use byteorder::ByteOrder;
use meshply_core::{Error, Result};
use std::io::{BufRead, ErrorKind, Read};
use std::marker::PhantomData;

/// Sequential access to the values of a PLY body.
///
/// The underlying channel is released when the input is dropped.
pub(crate) trait Input {
    /// Decode the next value, which the header declares to be of type `ty`
    fn read(&mut self, ty: ScalarType) -> Result<Number>;

    /// Fail unless the body has been consumed completely
    fn expect_end(&mut self) -> Result<()>;
}

/// Token reader for `format ascii` bodies
pub(crate) struct AsciiInput<R> {
    reader: R,
    line: Vec<u8>,
    pos: usize,
}

impl<R: BufRead> AsciiInput<R> {
    /// Wrap a reader positioned at the start of the file, skipping the header
    pub fn new(mut reader: R) -> Result<Self> {
        let mut line = String::new();
        loop {
            if !read_header_line(&mut reader, &mut line)? {
                return Err(Error::format("Cannot find the end of the header"));
            }
            if line == END_HEADER {
                break;
            }
        }
        Ok(Self {
            reader,
            line: Vec::new(),
            pos: 0,
        })
    }

    /// Byte range of the next token within `self.line`, `None` at end of input
    fn next_token(&mut self) -> Result<Option<(usize, usize)>> {
        loop {
            let bytes = &self.line;
            let mut start = self.pos;
            while start < bytes.len() && bytes[start].is_ascii_whitespace() {
                start += 1;
            }
            if start < bytes.len() {
                let mut end = start;
                while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
                    end += 1;
                }
                self.pos = end;
                return Ok(Some((start, end)));
            }

            self.line.clear();
            self.pos = 0;
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
        }
    }

    fn token_text(&self, (start, end): (usize, usize)) -> String {
        String::from_utf8_lossy(&self.line[start..end]).into_owned()
    }
}

impl<R: BufRead> Input for AsciiInput<R> {
    fn read(&mut self, ty: ScalarType) -> Result<Number> {
        let (start, end) = self
            .next_token()?
            .ok_or_else(|| Error::format("Unexpected end of file"))?;
        match std::str::from_utf8(&self.line[start..end]) {
            Ok(token) => ty.parse_ascii(token),
            Err(_) => Err(Error::format(format!(
                "Cannot parse '{}' as {}",
                self.token_text((start, end)),
                ty
            ))),
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.next_token()? {
            None => Ok(()),
            Some(range) => Err(Error::format(format!(
                "Invalid file format: expected end of file, found {}",
                self.token_text(range)
            ))),
        }
    }
}

/// Default size of the binary read buffer
pub(crate) const BUFFER_CAPACITY: usize = 8192;

/// Smallest buffer that still holds the sentinel line and any scalar
const MIN_BUFFER_CAPACITY: usize = 32;

/// Finds the `end_header` line in a buffer that grows across reads.
///
/// The line may end in `\n` or `\r\n`, the same endings the header parser
/// accepts.
///
/// The scanner only remembers offsets, so the owner may refill the buffer
/// between calls and drop already scanned bytes from its front with
/// [`HeaderScanner::discard`].
#[derive(Debug, Default)]
pub(crate) struct HeaderScanner {
    /// Offset of the first byte of the line being scanned
    line_start: usize,
    /// Number of bytes already examined
    scanned: usize,
}

impl HeaderScanner {
    /// Examine the bytes of `buffer` not seen yet.
    ///
    /// Returns the offset of the first body byte once the sentinel line is found.
    pub fn scan(&mut self, buffer: &[u8]) -> Option<usize> {
        while self.scanned < buffer.len() {
            let i = self.scanned;
            self.scanned += 1;
            if buffer[i] == b'\n' {
                let line = &buffer[self.line_start..i];
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                if line == END_HEADER.as_bytes() {
                    return Some(i + 1);
                }
                self.line_start = i + 1;
            }
        }
        None
    }

    /// Start of the incomplete line at the end of the scanned region
    pub fn line_start(&self) -> usize {
        self.line_start
    }

    /// Rebase after the owner removed `count` bytes from the front of the buffer
    pub fn discard(&mut self, count: usize) {
        debug_assert!(count <= self.line_start);
        self.line_start -= count;
        self.scanned -= count;
    }
}

/// Buffered reader for `format binary_*_endian` bodies.
///
/// Unread bytes live in `buffer[start..end]`.
pub(crate) struct BinaryInput<R, B> {
    channel: R,
    buffer: Box<[u8]>,
    start: usize,
    end: usize,
    _order: PhantomData<B>,
}

impl<R: Read, B: ByteOrder> BinaryInput<R, B> {
    /// Wrap a channel positioned at the start of the file, skipping the header
    pub fn new(channel: R) -> Result<Self> {
        Self::with_capacity(channel, BUFFER_CAPACITY)
    }

    pub fn with_capacity(channel: R, capacity: usize) -> Result<Self> {
        let mut input = Self {
            channel,
            buffer: vec![0; capacity.max(MIN_BUFFER_CAPACITY)].into_boxed_slice(),
            start: 0,
            end: 0,
            _order: PhantomData,
        };
        input.skip_header()?;
        Ok(input)
    }

    fn skip_header(&mut self) -> Result<()> {
        let mut scanner = HeaderScanner::default();
        loop {
            if self.end == self.buffer.len() {
                // Keep only the unfinished line; a line filling the whole buffer can never end.
                let keep_from = scanner.line_start();
                if keep_from == 0 {
                    return Err(Error::format("Line too long"));
                }
                self.buffer.copy_within(keep_from..self.end, 0);
                self.end -= keep_from;
                scanner.discard(keep_from);
            }
            if self.fill()? == 0 {
                return Err(Error::format("Cannot find the end of the header"));
            }
            if let Some(body_start) = scanner.scan(&self.buffer[..self.end]) {
                self.start = body_start;
                return Ok(());
            }
        }
    }

    /// Append whatever the channel yields to the free tail of the buffer.
    ///
    /// Returns 0 at end of channel.
    fn fill(&mut self) -> Result<usize> {
        loop {
            match self.channel.read(&mut self.buffer[self.end..]) {
                Ok(read) => {
                    self.end += read;
                    return Ok(read);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Move the unread bytes to the front of the buffer
    fn compact(&mut self) {
        self.buffer.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
    }

    /// Make at least `width` unread bytes available
    fn ensure(&mut self, width: usize) -> Result<()> {
        while self.end - self.start < width {
            if self.buffer.len() - self.end < MAX_SCALAR_WIDTH {
                self.compact();
            }
            if self.fill()? == 0 {
                return Err(Error::format("Unexpected end of file"));
            }
        }
        Ok(())
    }
}

impl<R: Read, B: ByteOrder> Input for BinaryInput<R, B> {
    fn read(&mut self, ty: ScalarType) -> Result<Number> {
        let width = ty.width();
        self.ensure(width)?;
        let value = ty.decode::<B>(&self.buffer[self.start..self.start + width]);
        self.start += width;
        Ok(value)
    }

    fn expect_end(&mut self) -> Result<()> {
        if self.start != self.end {
            return Err(Error::format(format!(
                "Expected end of file, found {} more bytes",
                self.end - self.start
            )));
        }
        self.start = 0;
        self.end = 0;
        if self.fill()? != 0 {
            return Err(Error::format("Expected end of file"));
        }
        Ok(())
    }
}
