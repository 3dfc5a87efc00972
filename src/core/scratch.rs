//! Reusable byte accumulator for values that contain escapes
//!
//! Reset keeps the allocation so a buffer can be reused for every text run
//! and attribute value of a document.

/// Append-only byte buffer with a resettable logical size.
#[derive(Debug, Default, Clone)]
pub struct ScratchBuffer {
    buf: Vec<u8>,
}

impl ScratchBuffer {
    pub fn new() -> Self {
        ScratchBuffer { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ScratchBuffer {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append bytes. Empty input is a no-op.
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Drop the contents, keeping capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    #[inline]
    pub fn get(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}
