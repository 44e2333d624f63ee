/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `flakekey` can emit.
///
/// Sequence exhaustion is never an error (the generator waits instead) and
/// identity hints are never rejected (they are masked). What remains is lock
/// poisoning, explicit shutdown, and malformed text handed to the decoders.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator lock was poisoned by a thread that panicked while
    /// holding it. Never produced with the `parking-lot` feature.
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// The generator was interrupted with
    /// [`LockFlakeGenerator::interrupt`](crate::LockFlakeGenerator::interrupt)
    /// and no longer issues identifiers.
    #[error("generator interrupted")]
    Interrupted,

    /// The base63 input was empty.
    #[error("cannot decode an empty base63 string")]
    DecodeEmpty,

    /// The base63 input contains a byte outside the alphabet.
    #[error("invalid base63 byte {byte:#04x} at index {index}")]
    DecodeInvalidAscii { byte: u8, index: usize },

    /// The base63 input encodes a value wider than 64 bits.
    #[error("base63 value overflows 64 bits")]
    DecodeOverflow,

    /// The key has no `_` between its prefix and encoded identifier.
    #[error("key {0:?} has no separator")]
    MissingSeparator(String),

    /// The key's encoded identifier has leading zero digits, so it would not
    /// print back the same.
    #[error("key {0:?} is not in canonical form")]
    NonCanonicalKey(String),
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
