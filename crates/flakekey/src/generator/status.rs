use crate::FlakeId;

/// Represents the result of a single, non-blocking generation attempt.
///
/// This type models the outcome of
/// [`LockFlakeGenerator::try_poll_id`](crate::LockFlakeGenerator::try_poll_id):
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the generator cannot produce a new ID
///   until the clock advances by `yield_for` milliseconds.
///
/// [`LockFlakeGenerator::next_id`](crate::LockFlakeGenerator::next_id) loops
/// over this for callers that prefer to block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated identifier.
        id: FlakeId,
    },
    /// No ID could be generated: either the 32 sequence values of the current
    /// millisecond are used up, or the clock reads earlier than the last
    /// issued timestamp.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}
