//! Byte cursor over the input buffer
//!
//! Uses memchr for delimiter searches. Structural scanning is ASCII only;
//! bytes >= 0x80 are opaque content.

use memchr::{memchr, memchr2, memmem};

use crate::error::{Error, Result};

const PREMATURE_END: &str = "xml stream ended prematurely.";

/// Parse cursor: position, length and element nesting depth.
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Number of open, non-self-closing elements.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn nest_up(&mut self) {
        self.depth += 1;
    }

    /// Leave one nesting level. Fails when no element is open.
    pub fn nest_down(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(self.error("unexpected closing element."));
        }
        self.depth -= 1;
        Ok(())
    }

    /// Check if there is at least one byte left
    #[inline]
    pub fn has_char(&self) -> bool {
        self.pos < self.input.len()
    }

    /// Number of bytes left
    #[inline]
    pub fn remains(&self) -> usize {
        self.input.len().saturating_sub(self.pos)
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos.min(self.input.len())..]
    }

    /// Get a slice from start to end positions
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.input[start..end]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Current byte, or an error at end of input.
    #[inline]
    pub fn cur_checked(&self) -> Result<u8> {
        self.peek().ok_or_else(|| self.error(PREMATURE_END))
    }

    /// Advance one byte and return the new current byte, failing at end of input.
    #[inline]
    pub fn next_checked(&mut self) -> Result<u8> {
        self.pos += 1;
        self.cur_checked()
    }

    /// Advance one byte, failing if that leaves the cursor at end of input.
    #[inline]
    pub fn next_check(&mut self) -> Result<()> {
        self.next_checked().map(|_| ())
    }

    /// Fail with `msg` when the input is exhausted.
    #[inline]
    pub fn require_char(&self, msg: &'static str) -> Result<()> {
        if self.has_char() {
            Ok(())
        } else {
            Err(self.error(msg))
        }
    }

    /// Malformed-document error at the current position
    #[inline]
    pub fn error(&self, msg: impl Into<std::borrow::Cow<'static, str>>) -> Error {
        Error::malformed(msg, self.pos)
    }

    /// Skip blank characters (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_blank(&mut self) {
        while self.pos < self.input.len() && is_blank(self.input[self.pos]) {
            self.pos += 1;
        }
    }

    /// Find next '<' or '&' (text content boundaries)
    #[inline]
    pub fn find_text_boundary(&self) -> Option<usize> {
        memchr2(b'<', b'&', self.remaining()).map(|i| self.pos + i)
    }

    /// Find next occurrence of a specific byte
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, self.remaining()).map(|i| self.pos + i)
    }

    /// Find next occurrence of either of two bytes
    #[inline]
    pub fn find_byte2(&self, b1: u8, b2: u8) -> Option<usize> {
        memchr2(b1, b2, self.remaining()).map(|i| self.pos + i)
    }

    /// Find next occurrence of a byte sequence
    #[inline]
    pub fn find_seq(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(self.remaining(), needle).map(|i| self.pos + i)
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Advance one byte and require the following bytes to equal `expected`.
    ///
    /// The cursor is left on the byte after the matched sequence.
    pub fn expects_next(&mut self, expected: &'static str) -> Result<()> {
        if self.remains() < expected.len() + 1 {
            return Err(self.error(
                "not enough stream left to check for an expected string segment.",
            ));
        }
        self.pos += 1;
        if !self.starts_with(expected.as_bytes()) {
            return Err(self.error(format!("'{}' was expected, but not found.", expected)));
        }
        self.pos += expected.len();
        Ok(())
    }

    /// Read a name: an ASCII letter followed by letters, digits, '-' or '_'.
    ///
    /// A name running up to the end of input is an error, since every name
    /// must be followed by something.
    pub fn read_name(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let first = self.cur_checked()?;
        if !is_alpha(first) {
            return Err(self.error(format!(
                "name must begin with an alphabet, but got this instead '{}'",
                first.escape_ascii()
            )));
        }

        let mut c = first;
        while is_alpha(c) || is_numeric(c) || is_name_char(c) {
            c = self.next_checked()?;
        }

        Ok(&self.input[start..self.pos])
    }

    /// Read `name` or `prefix:name`, returning `(prefix, name)`.
    ///
    /// The prefix is empty when the name is not qualified.
    pub fn read_qname(&mut self) -> Result<(&'a [u8], &'a [u8])> {
        let start = self.pos;
        let first = self.read_name()?;
        if self.peek() == Some(b':') {
            self.next_check()?;
            let local = self.read_name()?;
            return Ok((first, local));
        }
        // Empty prefixes still point into the input.
        Ok((&self.input[start..start], first))
    }
}

/// ASCII letter
#[inline]
pub fn is_alpha(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

/// ASCII digit
#[inline]
pub fn is_numeric(b: u8) -> bool {
    b.is_ascii_digit()
}

/// Punctuation allowed inside a name after the first character
#[inline]
pub fn is_name_char(b: u8) -> bool {
    matches!(b, b'-' | b'_')
}

/// Space, tab, newline or carriage return
#[inline]
pub fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_text_boundary() {
        let scanner = Scanner::new(b"hello &amp; <world>");
        assert_eq!(scanner.find_text_boundary(), Some(6));
    }

    #[test]
    fn test_read_name() {
        let mut scanner = Scanner::new(b"element-name>");
        assert_eq!(scanner.read_name().unwrap(), b"element-name");
        assert_eq!(scanner.position(), 12);
    }

    #[test]
    fn test_read_name_rejects_leading_digit() {
        let mut scanner = Scanner::new(b"1abc>");
        let err = scanner.read_name().unwrap_err();
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn test_read_name_at_end_of_input() {
        let mut scanner = Scanner::new(b"abc");
        assert!(scanner.read_name().is_err());
    }

    #[test]
    fn test_read_qname() {
        let mut scanner = Scanner::new(b"r:id=");
        let (prefix, name) = scanner.read_qname().unwrap();
        assert_eq!(prefix, b"r");
        assert_eq!(name, b"id");

        let mut scanner = Scanner::new(b"sheetData>");
        let (prefix, name) = scanner.read_qname().unwrap();
        assert!(prefix.is_empty());
        assert_eq!(name, b"sheetData");
    }

    #[test]
    fn test_skip_blank() {
        let mut scanner = Scanner::new(b"  \t\n hello");
        scanner.skip_blank();
        assert_eq!(scanner.position(), 5);
    }

    #[test]
    fn test_expects_next() {
        let mut scanner = Scanner::new(b"[CDATA[x]]>");
        scanner.expects_next("CDATA[").unwrap();
        assert_eq!(scanner.peek(), Some(b'x'));

        let mut scanner = Scanner::new(b"[CDATX[x]]>");
        assert!(scanner.expects_next("CDATA[").is_err());
    }

    #[test]
    fn test_nesting() {
        let mut scanner = Scanner::new(b"");
        assert!(scanner.nest_down().is_err());
        scanner.nest_up();
        assert_eq!(scanner.depth(), 1);
        scanner.nest_down().unwrap();
        assert_eq!(scanner.depth(), 0);
    }
}
