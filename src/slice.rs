//! Non-owning views into a backing buffer.

use crate::error::{Error, Result};

/// A bounded view into borrowed bytes.
///
/// Offsets passed to a `Slice` are absolute positions in the backing
/// buffer, so a view handed to a nested decoder keeps the same addressing
/// as its parent. Creating a sub-view never allocates or copies.
#[derive(Debug, Clone, Copy)]
pub struct Slice<'a> {
    backing: &'a [u8],
    start: usize,
    len: usize,
}

impl<'a> Slice<'a> {
    /// Creates a view over the whole buffer.
    pub fn new(backing: &'a [u8]) -> Self {
        Self {
            backing,
            start: 0,
            len: backing.len(),
        }
    }

    /// First absolute offset inside the view.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last absolute offset inside the view.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Number of bytes in the view.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the view is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bytes of the whole view.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.backing[self.start..self.end()]
    }

    /// Checks that `[offset, offset + len)` lies inside the view.
    pub fn check(&self, offset: usize, len: usize) -> Result<()> {
        let available = self.end().saturating_sub(offset);
        if offset < self.start || offset > self.end() || len > available {
            return Err(Error::buffer_underflow(len, available));
        }
        Ok(())
    }

    /// Returns the byte at an absolute offset.
    pub fn byte(&self, offset: usize) -> Result<u8> {
        self.check(offset, 1)?;
        Ok(self.backing[offset])
    }

    /// Borrows `len` bytes at an absolute offset.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        self.check(offset, len)?;
        Ok(&self.backing[offset..offset + len])
    }

    /// Narrows the view to `[offset, offset + len)`, sharing the backing bytes.
    pub fn sub(&self, offset: usize, len: usize) -> Result<Slice<'a>> {
        self.check(offset, len)?;
        Ok(Slice {
            backing: self.backing,
            start: offset,
            len,
        })
    }
}
