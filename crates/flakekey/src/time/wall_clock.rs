use crate::{FLAKEKEY_EPOCH, TimeSource};
use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// A time source reading the system wall clock on every call.
///
/// This is the clock the process generator uses. It follows NTP corrections
/// and manual adjustments, so it may step backward; the generator waits out a
/// backward step rather than issuing an out-of-order identifier. Use
/// [`MonotonicClock`](crate::MonotonicClock) to avoid those stalls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    epoch_millis: u64,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`FLAKEKEY_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(FLAKEKEY_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock whose zero is `epoch`, given as a [`Duration`]
    /// since 1970-01-01 UTC.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self {
            epoch_millis: epoch.as_millis() as u64,
        }
    }

    /// The configured epoch in milliseconds since 1970-01-01 UTC.
    pub const fn epoch_millis(&self) -> u64 {
        self.epoch_millis
    }
}

impl TimeSource for WallClock {
    /// Milliseconds elapsed since the epoch. A system clock set before the
    /// epoch reads as zero.
    fn current_millis(&self) -> u64 {
        let unix_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);
        unix_millis.saturating_sub(self.epoch_millis)
    }
}
