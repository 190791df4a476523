//! Codepoint splitting.
//!
//! Rules and texts are scanned one UTF-8 codepoint at a time. The splitter
//! only checks the structure of each sequence (a lead byte followed by the
//! number of `10xxxxxx` bytes it announces); it does not reject overlong or
//! surrogate encodings, and it accepts the historical 5- and 6-byte forms.
//! Every continuation read is bounds-checked against the buffer.
//!
//! A codepoint is carried through the automaton as a [`Symbol`]: its bytes
//! packed into a `u64`, so that equality and hashing are by content and the
//! key is `Copy`.

use std::fmt;
use std::ops::Range;

use crate::error::{DecodeError, DecodeErrorKind};

/// Longest sequence the splitter accepts.
pub const MAX_SEQUENCE_LEN: usize = 6;

/// A read-only view of one codepoint's bytes inside a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    #[inline]
    pub fn range(self) -> Range<usize> {
        self.start..self.start + self.len
    }

    #[inline]
    pub fn bytes(self, buf: &[u8]) -> &[u8] {
        &buf[self.range()]
    }
}

/// The content of one codepoint, compared and hashed by its bytes.
///
/// Layout: the sequence length in the top byte, the bytes big-endian in the
/// low 48 bits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u64);

impl Symbol {
    /// Pack a single byte.
    #[inline]
    pub const fn ascii(byte: u8) -> Symbol {
        Symbol((1 << 56) | byte as u64)
    }

    /// Pack the bytes of one codepoint. `bytes` must hold 1 to 6 bytes.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Symbol {
        debug_assert!(!bytes.is_empty() && bytes.len() <= MAX_SEQUENCE_LEN);
        let packed = bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
        Symbol(((bytes.len() as u64) << 56) | packed)
    }

    /// Number of bytes in the codepoint.
    #[inline]
    pub fn len(self) -> usize {
        (self.0 >> 56) as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Unpack into a fixed buffer; the first `len()` bytes are significant.
    pub fn to_bytes(self) -> ([u8; MAX_SEQUENCE_LEN], usize) {
        let len = self.len();
        let mut out = [0u8; MAX_SEQUENCE_LEN];
        for (i, slot) in out.iter_mut().take(len).enumerate() {
            *slot = (self.0 >> (8 * (len - 1 - i))) as u8;
        }
        (out, len)
    }

    /// The codepoint as a `char`, if it is valid UTF-8.
    pub fn to_char(self) -> Option<char> {
        let (bytes, len) = self.to_bytes();
        std::str::from_utf8(&bytes[..len]).ok()?.chars().next()
    }

    #[inline]
    pub fn is_whitespace(self) -> bool {
        self.to_char().is_some_and(char::is_whitespace)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_char() {
            Some(c) => write!(f, "{:?}", c),
            None => {
                let (bytes, len) = self.to_bytes();
                write!(f, "{:02x?}", &bytes[..len])
            }
        }
    }
}

/// Iterator over the codepoint spans of a buffer.
///
/// Yields one error and then stops if the buffer is malformed.
pub struct Codepoints<'a> {
    buf: &'a [u8],
    pos: usize,
    stop_at_nul: bool,
    done: bool,
}

impl<'a> Codepoints<'a> {
    pub fn new(buf: &'a [u8], stop_at_nul: bool) -> Self {
        Self {
            buf,
            pos: 0,
            stop_at_nul,
            done: false,
        }
    }

    fn sequence_at(&self, start: usize) -> Result<Span, DecodeError> {
        let lead = self.buf[start];
        let len = match lead.leading_ones() {
            0 => 1,
            1 => return Err(error(start, DecodeErrorKind::StrayContinuation)),
            n @ 2..=6 => n as usize,
            _ => return Err(error(start, DecodeErrorKind::InvalidLead)),
        };

        for offset in start + 1..start + len {
            match self.buf.get(offset) {
                None => return Err(error(start, DecodeErrorKind::Truncated)),
                Some(b) if b & 0xC0 != 0x80 => {
                    return Err(error(offset, DecodeErrorKind::BadContinuation))
                }
                Some(_) => {}
            }
        }
        Ok(Span { start, len })
    }
}

fn error(offset: usize, kind: DecodeErrorKind) -> DecodeError {
    DecodeError { offset, kind }
}

impl Iterator for Codepoints<'_> {
    type Item = Result<Span, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.buf.len() {
            return None;
        }
        if self.stop_at_nul && self.buf[self.pos] == 0 {
            self.done = true;
            return None;
        }
        match self.sequence_at(self.pos) {
            Ok(span) => {
                self.pos += span.len;
                Some(Ok(span))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Split `buf` into symbols, or report the first malformed sequence.
pub fn split(buf: &[u8], stop_at_nul: bool) -> Result<Vec<Symbol>, DecodeError> {
    Codepoints::new(buf, stop_at_nul)
        .map(|span| span.map(|s| Symbol::from_bytes(s.bytes(buf))))
        .collect()
}
