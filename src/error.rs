//! Typed, recoverable errors.
//!
//! Precondition violations (out-of-range bits, mismatched capacities) stay
//! as `debug_assert!`/panic — they are programming bugs, not conditions a
//! caller can meaningfully recover from. [`ScanError`] is the one failure
//! mode a caller can legitimately catch and react to.

use thiserror::Error;

/// Errors raised while initializing or stepping a [`crate::scan::Scannable`]
/// scan.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// A destructive scan was initialized on a sparse bitset with no block
    /// records to index.
    #[error("cannot start a destructive scan on an empty sparse bitset")]
    ScanOnEmpty,

    /// `init_scan_from` was called with a destructive [`crate::scan::ScanMode`].
    /// Destructive scans always start at an extremum; there is no well-defined
    /// "resume destructively from this bit" semantics (SPEC_FULL §4.4).
    #[error("destructive scans cannot be started from a specific bit position")]
    DestructiveFromPosition,
}
