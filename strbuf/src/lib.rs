//! # Eä String Buffers
//!
//! Bounded copy and append of NUL-terminated byte strings into buffers of
//! known capacity, with fail-fast termination instead of overflow.
//!
//! ## Features
//! - Capacity carried by the destination's type ([`FixedBuf`], `[u8; N]`,
//!   slices) or declared explicitly ([`Unbounded`], [`WithCapacity`])
//! - One bounded-append core behind every write; lengths are measured and the
//!   result checked before any byte moves
//! - Violations abort the process after an optional diagnostic hook
//!   ([`Sentinel`]); the `checked_*` family returns [`StrError`] instead
//! - Failed copies leave the destination empty and terminated, never garbage
//!
//! ## Example
//!
//! ```rust
//! use ea_strbuf::{safe_concat, safe_copy, safe_length, FixedBuf};
//!
//! let mut path = FixedBuf::<16>::new();
//! safe_copy(&mut path, c"/var");
//! safe_concat(&mut path, c"/cache");
//! assert_eq!(safe_length(&path), 10);
//! assert_eq!(path.as_bytes(), b"/var/cache");
//! ```
//!
//! A destination that is too small terminates the process:
//!
//! ```rust,no_run
//! use ea_strbuf::{copy_buf, FixedBuf};
//!
//! let mut name = FixedBuf::<8>::new();
//! // prints "overflow while copying 'c"0123456789"' to 'name' failed at src/main.rs:5"
//! copy_buf!(name, c"0123456789");
//! ```

#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod buffer;
pub mod capacity;
pub mod engine;
pub mod error;
pub mod fatal;

pub use buffer::FixedBuf;
pub use capacity::{
    capacity_of, Capacity, Terminated, TerminatedMut, Unbounded, UnboundedMut, WithCapacity,
};
pub use engine::{
    checked_append, checked_append_with_capacity, checked_concat, checked_copy, checked_length,
    safe_append, safe_append_with_capacity, safe_concat, safe_copy, safe_length, UNLIMITED,
};
pub use error::{Role, StrError};
pub use fatal::{install, installed, DiagnosticHook, FatalRecord, Sentinel, SentinelBuilder};
