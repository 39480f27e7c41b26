//! Bounded length, copy and append.
//!
//! Every write funnels through one bounded-append core. Lengths of source and
//! destination are measured first, the final length is compared against the
//! destination capacity, and only then are bytes moved.
//!
//! Two families share that core:
//! - `safe_*` (and the matching [`Sentinel`] methods) terminate the process on
//!   any violation;
//! - `checked_*` return the violation as a [`StrError`].

use tracing::trace;

use crate::capacity::{Capacity, Terminated, TerminatedMut, WithCapacity};
use crate::error::{Role, StrError};
use crate::fatal::Sentinel;

/// Count value meaning "the whole source".
pub const UNLIMITED: usize = usize::MAX;

const APPEND_OVERFLOW: &str = "overflow while appending source to destination";
const COPY_OVERFLOW: &str = "overflow while copying source to destination";

/// Offset of the first terminator within the declared bound.
fn measure<T: Terminated + ?Sized>(seq: &T, role: Role) -> Result<usize, StrError> {
    let storage = seq.storage().ok_or(StrError::NullReference { role })?;
    let bound = seq.capacity().limit().min(storage.len());
    storage[..bound]
        .iter()
        .position(|&b| b == 0)
        .ok_or(StrError::UnterminatedSequence {
            role,
            capacity: bound,
        })
}

fn append_core<D, S>(dest: &mut D, src: &S, max_count: usize) -> Result<usize, StrError>
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    let source_len = measure(src, Role::Source)?;
    let dest_len = measure(&*dest, Role::Destination)?;
    let copy_len = source_len.min(max_count);
    let final_len = dest_len + copy_len;

    match dest.capacity() {
        Capacity::Fixed(capacity) if final_len >= capacity => {
            return Err(StrError::CapacityExceeded {
                required: final_len + 1,
                capacity,
            });
        }
        Capacity::Fixed(_) => {}
        Capacity::Unbounded => {
            trace!(final_len, "unbounded destination, capacity check skipped");
        }
    }

    let source = src
        .storage()
        .ok_or(StrError::NullReference { role: Role::Source })?;
    let storage = dest.storage_mut().ok_or(StrError::NullReference {
        role: Role::Destination,
    })?;
    let available = storage.len();
    let Some(window) = storage.get_mut(dest_len..=final_len) else {
        return Err(StrError::CapacityExceeded {
            required: final_len + 1,
            capacity: available,
        });
    };
    window[..copy_len].copy_from_slice(&source[..copy_len]);
    window[copy_len] = 0;
    Ok(final_len)
}

fn copy_core<D, S>(dest: &mut D, src: &S) -> Result<usize, StrError>
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    if dest.capacity() == Capacity::Fixed(0) {
        return Err(StrError::ZeroCapacityDestination);
    }
    let storage = dest.storage_mut().ok_or(StrError::NullReference {
        role: Role::Destination,
    })?;
    let first = storage
        .first_mut()
        .ok_or(StrError::ZeroCapacityDestination)?;
    *first = 0;
    append_core(dest, src, UNLIMITED)
}

/// Length of `seq`, or the violation that prevents measuring it.
pub fn checked_length<T: Terminated + ?Sized>(seq: &T) -> Result<usize, StrError> {
    measure(seq, Role::Sequence)
}

/// Append at most `max_count` bytes of `src` onto `dest`.
///
/// # Errors
/// Null or unterminated operands, or a result that does not fit `dest`
/// together with its terminator. `dest` is untouched on error.
pub fn checked_append<'d, D, S>(
    dest: &'d mut D,
    src: &S,
    max_count: usize,
) -> Result<&'d mut D, StrError>
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    append_core(&mut *dest, src, max_count)?;
    Ok(dest)
}

/// Append all of `src` onto `dest`.
///
/// # Errors
/// As [`checked_append`].
pub fn checked_concat<'d, D, S>(dest: &'d mut D, src: &S) -> Result<&'d mut D, StrError>
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    checked_append(dest, src, UNLIMITED)
}

/// Replace the content of `dest` with `src`.
///
/// # Errors
/// As [`checked_append`], plus [`StrError::ZeroCapacityDestination`]. Once the
/// destination has passed the zero-capacity and null checks it is left empty
/// and terminated on error.
pub fn checked_copy<'d, D, S>(dest: &'d mut D, src: &S) -> Result<&'d mut D, StrError>
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    copy_core(&mut *dest, src)?;
    Ok(dest)
}

/// Append all of `src` onto `dest`, treating `dest` as holding `capacity` bytes.
///
/// # Errors
/// As [`checked_append`], measured against `capacity` and never beyond the
/// storage `dest` actually has.
pub fn checked_append_with_capacity<'d, D, S>(
    dest: &'d mut D,
    capacity: usize,
    src: &S,
) -> Result<&'d mut D, StrError>
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    append_core(&mut WithCapacity::new(&mut *dest, capacity), src, UNLIMITED)?;
    Ok(dest)
}

impl Sentinel {
    /// Length of `seq`; terminates on a null or unterminated sequence.
    #[track_caller]
    pub fn length<T: Terminated + ?Sized>(&self, seq: &T) -> usize {
        match measure(seq, Role::Sequence) {
            Ok(len) => len,
            Err(err) => self.fail(&err.to_string()),
        }
    }

    /// Bounded append; terminates on violation.
    #[track_caller]
    pub fn append<'d, D, S>(&self, dest: &'d mut D, src: &S, max_count: usize) -> &'d mut D
    where
        D: TerminatedMut + ?Sized,
        S: Terminated + ?Sized,
    {
        self.append_described(dest, src, max_count, APPEND_OVERFLOW)
    }

    /// Bounded append reporting `overflow` as the failed condition when the
    /// result does not fit.
    #[track_caller]
    pub fn append_described<'d, D, S>(
        &self,
        dest: &'d mut D,
        src: &S,
        max_count: usize,
        overflow: &str,
    ) -> &'d mut D
    where
        D: TerminatedMut + ?Sized,
        S: Terminated + ?Sized,
    {
        if let Err(err) = append_core(&mut *dest, src, max_count) {
            self.reject(&err, overflow);
        }
        dest
    }

    /// Append all of `src`; terminates on violation.
    #[track_caller]
    pub fn concat<'d, D, S>(&self, dest: &'d mut D, src: &S) -> &'d mut D
    where
        D: TerminatedMut + ?Sized,
        S: Terminated + ?Sized,
    {
        self.append_described(dest, src, UNLIMITED, APPEND_OVERFLOW)
    }

    /// Bounded overwrite; terminates on violation.
    #[track_caller]
    pub fn copy<'d, D, S>(&self, dest: &'d mut D, src: &S) -> &'d mut D
    where
        D: TerminatedMut + ?Sized,
        S: Terminated + ?Sized,
    {
        self.copy_described(dest, src, COPY_OVERFLOW)
    }

    /// Bounded overwrite reporting `overflow` when the source does not fit.
    #[track_caller]
    pub fn copy_described<'d, D, S>(
        &self,
        dest: &'d mut D,
        src: &S,
        overflow: &str,
    ) -> &'d mut D
    where
        D: TerminatedMut + ?Sized,
        S: Terminated + ?Sized,
    {
        if let Err(err) = copy_core(&mut *dest, src) {
            self.reject(&err, overflow);
        }
        dest
    }

    /// Append all of `src` into a destination of caller-known `capacity`;
    /// terminates on violation.
    #[track_caller]
    pub fn append_with_capacity<'d, D, S>(
        &self,
        dest: &'d mut D,
        capacity: usize,
        src: &S,
    ) -> &'d mut D
    where
        D: TerminatedMut + ?Sized,
        S: Terminated + ?Sized,
    {
        self.append_with_capacity_described(dest, capacity, src, COPY_OVERFLOW)
    }

    /// As [`Sentinel::append_with_capacity`], reporting `overflow` on overflow.
    #[track_caller]
    pub fn append_with_capacity_described<'d, D, S>(
        &self,
        dest: &'d mut D,
        capacity: usize,
        src: &S,
        overflow: &str,
    ) -> &'d mut D
    where
        D: TerminatedMut + ?Sized,
        S: Terminated + ?Sized,
    {
        let mut view = WithCapacity::new(&mut *dest, capacity);
        if let Err(err) = append_core(&mut view, src, UNLIMITED) {
            self.reject(&err, overflow);
        }
        dest
    }

    /// Overflow reports the call-site description; everything else reports
    /// the condition the engine found violated.
    #[track_caller]
    fn reject(&self, err: &StrError, overflow: &str) -> ! {
        if err.is_overflow() {
            self.fail(overflow)
        } else {
            self.fail(&err.to_string())
        }
    }
}

/// Length of `seq` under the process-wide sentinel.
#[track_caller]
pub fn safe_length<T: Terminated + ?Sized>(seq: &T) -> usize {
    Sentinel::global().length(seq)
}

/// Append at most `max_count` bytes of `src` onto `dest` under the
/// process-wide sentinel.
#[track_caller]
pub fn safe_append<'d, D, S>(dest: &'d mut D, src: &S, max_count: usize) -> &'d mut D
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    Sentinel::global().append(dest, src, max_count)
}

/// Append all of `src` onto `dest` under the process-wide sentinel.
#[track_caller]
pub fn safe_concat<'d, D, S>(dest: &'d mut D, src: &S) -> &'d mut D
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    Sentinel::global().concat(dest, src)
}

/// Replace the content of `dest` with `src` under the process-wide sentinel.
#[track_caller]
pub fn safe_copy<'d, D, S>(dest: &'d mut D, src: &S) -> &'d mut D
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    Sentinel::global().copy(dest, src)
}

/// Append all of `src` into a destination of caller-known `capacity` under
/// the process-wide sentinel.
#[track_caller]
pub fn safe_append_with_capacity<'d, D, S>(
    dest: &'d mut D,
    capacity: usize,
    src: &S,
) -> &'d mut D
where
    D: TerminatedMut + ?Sized,
    S: Terminated + ?Sized,
{
    Sentinel::global().append_with_capacity(dest, capacity, src)
}

/// Append all of `src` to `dest`, naming both expressions in the overflow
/// report.
#[macro_export]
macro_rules! cat_buf {
    ($dest:expr, $src:expr $(,)?) => {
        $crate::ncat_buf!($dest, $src, $crate::UNLIMITED)
    };
}

/// Append at most `n` bytes of `src` to `dest`, naming both expressions in
/// the overflow report.
#[macro_export]
macro_rules! ncat_buf {
    ($dest:expr, $src:expr, $n:expr $(,)?) => {
        $crate::Sentinel::global().append_described(
            &mut $dest,
            &$src,
            $n,
            ::core::concat!(
                "overflow while appending '",
                ::core::stringify!($src),
                "' to '",
                ::core::stringify!($dest),
                "'"
            ),
        )
    };
}

/// Copy `src` over `dest`, naming both expressions in the overflow report.
#[macro_export]
macro_rules! copy_buf {
    ($dest:expr, $src:expr $(,)?) => {
        $crate::Sentinel::global().copy_described(
            &mut $dest,
            &$src,
            ::core::concat!(
                "overflow while copying '",
                ::core::stringify!($src),
                "' to '",
                ::core::stringify!($dest),
                "'"
            ),
        )
    };
}

/// Append all of `src` to `dest` of caller-known `capacity`, naming both
/// expressions in the overflow report.
#[macro_export]
macro_rules! lcat_buf {
    ($dest:expr, $src:expr, $capacity:expr $(,)?) => {
        $crate::Sentinel::global().append_with_capacity_described(
            &mut $dest,
            $capacity,
            &$src,
            ::core::concat!(
                "overflow while copying '",
                ::core::stringify!($src),
                "' to '",
                ::core::stringify!($dest),
                "'"
            ),
        )
    };
}
