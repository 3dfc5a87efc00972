//! Span - borrowed view of a text or attribute value
//!
//! A value either points straight into the input document (stable, valid
//! for the whole parse) or into a scratch buffer that is overwritten by the
//! next decoded value (transient, valid only during the callback that
//! received it). Handlers that keep a transient value must copy it.

use std::borrow::Cow;

/// A text or attribute value.
///
/// `'a` is the lifetime of the input buffer, `'s` the lifetime of the
/// scratch buffer borrow for the current callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a, 's> {
    /// Points into the input buffer and contains no decoded escapes.
    Stable(&'a [u8]),
    /// Points into a reused scratch buffer.
    Transient(&'s [u8]),
}

impl<'a, 's> Span<'a, 's> {
    /// An empty stable span
    #[inline]
    pub const fn empty() -> Self {
        Span::Stable(&[])
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match *self {
            Span::Stable(b) => b,
            Span::Transient(b) => b,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    #[inline]
    pub fn is_transient(&self) -> bool {
        matches!(self, Span::Transient(_))
    }

    /// The input-borrowed bytes, if this span is stable.
    #[inline]
    pub fn stable(&self) -> Option<&'a [u8]> {
        match *self {
            Span::Stable(b) => Some(b),
            Span::Transient(_) => None,
        }
    }

    /// Get the value as a string
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }

    /// Lossy string view, borrowing when the bytes are valid UTF-8
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// Copy the bytes out so they can outlive the callback.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Byte offset of a stable span within `input`.
    ///
    /// Returns None for transient spans and for slices that do not lie
    /// inside `input`.
    pub fn offset_in(&self, input: &[u8]) -> Option<usize> {
        let slice = self.stable()?;
        let input_start = input.as_ptr() as usize;
        let slice_start = slice.as_ptr() as usize;
        if slice_start >= input_start && slice_start + slice.len() <= input_start + input.len() {
            Some(slice_start - input_start)
        } else {
            None
        }
    }
}

impl Default for Span<'_, '_> {
    fn default() -> Self {
        Span::empty()
    }
}

/// Check whether `slice` lies inside `input` (pointer range test).
pub fn is_within(slice: &[u8], input: &[u8]) -> bool {
    let input_range = input.as_ptr_range();
    let slice_range = slice.as_ptr_range();
    slice_range.start >= input_range.start && slice_range.end <= input_range.end
}
