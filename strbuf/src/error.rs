//! Bounds violation taxonomy.
//!
//! Every variant is a programming defect. The primary operations escalate
//! them straight to [`crate::fatal`]; only the `checked_*` family hands them
//! back to the caller.

use core::fmt;

use thiserror::Error;

/// Which side of an operation a violation was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The byte sequence being read from.
    Source,
    /// The buffer being written into.
    Destination,
    /// A standalone sequence handed to a length query.
    Sequence,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => f.write_str("source"),
            Role::Destination => f.write_str("destination"),
            Role::Sequence => f.write_str("sequence"),
        }
    }
}

/// Bounds violation detected by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StrError {
    /// A reference was absent where content was required.
    #[error("{role} != NULL")]
    NullReference {
        /// Side that was absent.
        role: Role,
    },
    /// No terminator exists inside the declared bound.
    #[error("{role} terminated within {capacity} bytes")]
    UnterminatedSequence {
        /// Side that was unterminated.
        role: Role,
        /// Number of bytes scanned.
        capacity: usize,
    },
    /// Content plus terminator does not fit in the destination.
    #[error("{required} bytes (content + terminator) fit in capacity {capacity}")]
    CapacityExceeded {
        /// Bytes needed, terminator included.
        required: usize,
        /// Bytes available.
        capacity: usize,
    },
    /// The destination cannot even hold a terminator.
    #[error("destination capacity != 0")]
    ZeroCapacityDestination,
}

impl StrError {
    /// True for the overflow class, whose fatal description names the call site.
    pub fn is_overflow(&self) -> bool {
        matches!(self, StrError::CapacityExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_read_as_failed_conditions() {
        let err = StrError::NullReference { role: Role::Source };
        assert_eq!(err.to_string(), "source != NULL");

        let err = StrError::UnterminatedSequence {
            role: Role::Destination,
            capacity: 8,
        };
        assert_eq!(err.to_string(), "destination terminated within 8 bytes");

        assert_eq!(
            StrError::ZeroCapacityDestination.to_string(),
            "destination capacity != 0"
        );
    }

    #[test]
    fn test_overflow_class() {
        assert!(StrError::CapacityExceeded {
            required: 9,
            capacity: 8
        }
        .is_overflow());
        assert!(!StrError::ZeroCapacityDestination.is_overflow());
    }
}
