use crate::{FLAKEKEY_EPOCH, TimeSource};
use core::time::Duration;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// Shared counter advanced by the ticker thread once per millisecond.
#[derive(Debug)]
struct Ticker {
    elapsed: AtomicU64,
}

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// The wall clock is read exactly once, at construction, to align the
/// counter with the epoch. After that only [`Instant`] is consulted, so NTP
/// steps and manual clock changes never make it go backward.
///
/// A background thread advances the counter. It exits on its own once every
/// clone of the clock has been dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    ticker: Arc<Ticker>,
    epoch_offset: u64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`FLAKEKEY_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(FLAKEKEY_EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as t = 0.
    ///
    /// A system clock earlier than the epoch starts the counter at zero.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use flakekey::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::default();
    /// let before = clock.current_millis();
    /// std::thread::sleep(Duration::from_millis(5));
    ///
    /// // The ticker may lag a millisecond behind, but never goes backward.
    /// assert!(clock.current_millis() >= before);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Self {
        let start = Instant::now();
        let offset = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|now| now.checked_sub(epoch))
            .map_or(0, |d| d.as_millis() as u64);

        let ticker = Arc::new(Ticker {
            elapsed: AtomicU64::new(0),
        });

        let weak = Arc::downgrade(&ticker);
        thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(ticker) = weak.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                ticker.elapsed.store(now_ms, Ordering::Relaxed);

                // Align to next tick after the current actual time
                tick = now_ms + 1;
            }
        });

        Self {
            ticker,
            epoch_offset: offset,
        }
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.ticker.elapsed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_goes_backward() {
        let clock = MonotonicClock::default();
        let mut last = clock.current_millis();
        for _ in 0..1_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn monotonic_clock_advances() {
        let clock = MonotonicClock::with_epoch(Duration::ZERO);
        let before = clock.current_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_millis() > before);
    }
}
