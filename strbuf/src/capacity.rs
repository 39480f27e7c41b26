//! Capacity inference.
//!
//! A destination either carries its capacity in its type ([`crate::FixedBuf`],
//! `[u8; N]`, a slice) or is explicitly declared [`Capacity::Unbounded`]
//! ([`CStr`], [`Unbounded`], [`UnboundedMut`]). The classification is plain
//! trait dispatch: nothing is inspected at run time beyond the value the
//! implementation reports.

use core::ffi::CStr;

/// Capacity fact attached to a buffer reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// Exact number of bytes the buffer can hold, terminator included.
    Fixed(usize),
    /// Capacity not visible to the engine; no static comparison is possible.
    Unbounded,
}

impl Capacity {
    /// Numeric bound used for scanning and comparison.
    ///
    /// `Unbounded` maps to `usize::MAX`, the largest representable size.
    pub const fn limit(self) -> usize {
        match self {
            Capacity::Fixed(n) => n,
            Capacity::Unbounded => usize::MAX,
        }
    }

    /// Whether the capacity is statically known.
    pub const fn is_fixed(self) -> bool {
        matches!(self, Capacity::Fixed(_))
    }
}

/// A readable, NUL-terminated byte sequence with an associated capacity.
pub trait Terminated {
    /// Capacity fact for this reference.
    fn capacity(&self) -> Capacity;

    /// Backing bytes, or `None` for an absent (null) reference.
    ///
    /// The slice may extend past the terminator; the engine never reads
    /// beyond `capacity().limit()` bytes of it.
    fn storage(&self) -> Option<&[u8]>;
}

/// A writable [`Terminated`] buffer.
pub trait TerminatedMut: Terminated {
    /// Mutable backing bytes, or `None` for an absent (null) reference.
    fn storage_mut(&mut self) -> Option<&mut [u8]>;
}

/// Capacity of any buffer reference.
pub fn capacity_of<T: Terminated + ?Sized>(buf: &T) -> Capacity {
    buf.capacity()
}

impl<const N: usize> Terminated for [u8; N] {
    fn capacity(&self) -> Capacity {
        Capacity::Fixed(N)
    }

    fn storage(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }
}

impl<const N: usize> TerminatedMut for [u8; N] {
    fn storage_mut(&mut self) -> Option<&mut [u8]> {
        Some(self.as_mut_slice())
    }
}

// A slice always carries its extent.
impl Terminated for [u8] {
    fn capacity(&self) -> Capacity {
        Capacity::Fixed(self.len())
    }

    fn storage(&self) -> Option<&[u8]> {
        Some(self)
    }
}

impl TerminatedMut for [u8] {
    fn storage_mut(&mut self) -> Option<&mut [u8]> {
        Some(self)
    }
}

impl Terminated for CStr {
    fn capacity(&self) -> Capacity {
        Capacity::Unbounded
    }

    fn storage(&self) -> Option<&[u8]> {
        Some(self.to_bytes_with_nul())
    }
}

impl<T: Terminated + ?Sized> Terminated for &T {
    fn capacity(&self) -> Capacity {
        (**self).capacity()
    }

    fn storage(&self) -> Option<&[u8]> {
        (**self).storage()
    }
}

impl<T: Terminated + ?Sized> Terminated for &mut T {
    fn capacity(&self) -> Capacity {
        (**self).capacity()
    }

    fn storage(&self) -> Option<&[u8]> {
        (**self).storage()
    }
}

impl<T: TerminatedMut + ?Sized> TerminatedMut for &mut T {
    fn storage_mut(&mut self) -> Option<&mut [u8]> {
        (**self).storage_mut()
    }
}

/// `None` is the absent reference, the Rust shape of a nullable `char *`.
impl<T: Terminated> Terminated for Option<T> {
    fn capacity(&self) -> Capacity {
        self.as_ref().map_or(Capacity::Unbounded, Terminated::capacity)
    }

    fn storage(&self) -> Option<&[u8]> {
        self.as_ref().and_then(|inner| inner.storage())
    }
}

impl<T: TerminatedMut> TerminatedMut for Option<T> {
    fn storage_mut(&mut self) -> Option<&mut [u8]> {
        self.as_mut().and_then(|inner| inner.storage_mut())
    }
}

/// Read-only view whose capacity the caller declares unknown.
///
/// Length is decided purely by where the terminator falls in the backing
/// bytes.
#[derive(Debug, Clone, Copy)]
pub struct Unbounded<'a>(&'a [u8]);

impl<'a> Unbounded<'a> {
    /// Wrap backing bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }
}

impl Terminated for Unbounded<'_> {
    fn capacity(&self) -> Capacity {
        Capacity::Unbounded
    }

    fn storage(&self) -> Option<&[u8]> {
        Some(self.0)
    }
}

/// Writable view whose capacity the caller declares unknown.
///
/// Appends into it skip the capacity comparison. The write itself is still
/// confined to the backing slice: running off its end is reported as
/// [`crate::StrError::CapacityExceeded`] before any byte moves.
#[derive(Debug)]
pub struct UnboundedMut<'a>(&'a mut [u8]);

impl<'a> UnboundedMut<'a> {
    /// Wrap backing bytes.
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self(bytes)
    }
}

impl Terminated for UnboundedMut<'_> {
    fn capacity(&self) -> Capacity {
        Capacity::Unbounded
    }

    fn storage(&self) -> Option<&[u8]> {
        Some(&*self.0)
    }
}

impl TerminatedMut for UnboundedMut<'_> {
    fn storage_mut(&mut self) -> Option<&mut [u8]> {
        Some(&mut *self.0)
    }
}

/// Destination whose capacity is supplied by the caller rather than its type,
/// e.g. a heap buffer of externally tracked size.
#[derive(Debug)]
pub struct WithCapacity<'a, T: ?Sized> {
    inner: &'a mut T,
    capacity: usize,
}

impl<'a, T: TerminatedMut + ?Sized> WithCapacity<'a, T> {
    /// Attach `capacity` to `inner`, overriding whatever it reports.
    pub fn new(inner: &'a mut T, capacity: usize) -> Self {
        Self { inner, capacity }
    }
}

impl<T: TerminatedMut + ?Sized> Terminated for WithCapacity<'_, T> {
    fn capacity(&self) -> Capacity {
        Capacity::Fixed(self.capacity)
    }

    fn storage(&self) -> Option<&[u8]> {
        self.inner.storage()
    }
}

impl<T: TerminatedMut + ?Sized> TerminatedMut for WithCapacity<'_, T> {
    fn storage_mut(&mut self) -> Option<&mut [u8]> {
        self.inner.storage_mut()
    }
}
