//! Fixed-capacity, NUL-terminated byte buffer.

use core::ffi::CStr;
use core::fmt;
use core::str::Utf8Error;

use crate::capacity::{Capacity, Terminated, TerminatedMut};
use crate::engine;
use crate::error::StrError;

/// Inline buffer of exactly `N` bytes whose capacity is part of its type.
///
/// A fresh buffer holds the empty string. `N == 0` is representable but has
/// no room for a terminator, so every engine operation rejects it.
#[derive(Clone, Copy)]
pub struct FixedBuf<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedBuf<N> {
    /// Bytes available, terminator included.
    pub const CAPACITY: usize = N;

    /// Empty buffer.
    pub const fn new() -> Self {
        Self { bytes: [0; N] }
    }

    /// Adopt raw bytes as-is. Whether they are terminated is checked on use.
    pub const fn from_raw(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Buffer holding `src`; terminates the process if it does not fit.
    #[track_caller]
    pub fn from_cstr(src: &CStr) -> Self {
        let mut buf = Self::new();
        engine::safe_copy(&mut buf, src);
        buf
    }

    /// Declared capacity.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Content length; terminates the process if the buffer is unterminated.
    #[track_caller]
    pub fn len(&self) -> usize {
        engine::safe_length(self)
    }

    /// Whether the content is the empty string.
    #[track_caller]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content bytes, terminator excluded.
    #[track_caller]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Content as UTF-8.
    ///
    /// # Errors
    /// Content is not valid UTF-8.
    #[track_caller]
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        core::str::from_utf8(self.as_bytes())
    }

    /// Reset to the empty string. No-op for `N == 0`.
    pub fn clear(&mut self) {
        if let Some(first) = self.bytes.first_mut() {
            *first = 0;
        }
    }

    /// Whole backing array, including bytes past the terminator.
    pub const fn raw(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Mutable backing array. Nothing stops the caller from removing the
    /// terminator; the next engine call will catch it.
    pub fn raw_mut(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }

    fn content_lossy(&self) -> &[u8] {
        let end = self.bytes.iter().position(|&b| b == 0).unwrap_or(N);
        &self.bytes[..end]
    }
}

impl<const N: usize> Default for FixedBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for FixedBuf<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedBuf")
            .field("capacity", &N)
            .field("content", &String::from_utf8_lossy(self.content_lossy()))
            .finish()
    }
}

impl<const N: usize> TryFrom<&CStr> for FixedBuf<N> {
    type Error = StrError;

    fn try_from(src: &CStr) -> Result<Self, Self::Error> {
        let mut buf = Self::new();
        engine::checked_copy(&mut buf, src)?;
        Ok(buf)
    }
}

impl<const N: usize> Terminated for FixedBuf<N> {
    fn capacity(&self) -> Capacity {
        Capacity::Fixed(N)
    }

    fn storage(&self) -> Option<&[u8]> {
        Some(self.bytes.as_slice())
    }
}

impl<const N: usize> TerminatedMut for FixedBuf<N> {
    fn storage_mut(&mut self) -> Option<&mut [u8]> {
        Some(self.bytes.as_mut_slice())
    }
}
