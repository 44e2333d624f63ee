use core::{cmp::Ordering, time::Duration};

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{mutex::Mutex, waiter::Waiter};
use crate::{Error, FlakeId, IdGenStatus, Origin, Result, TimeSource};

/// A lock-based generator of [`FlakeId`]s, shared by reference across
/// threads.
///
/// The last issued identifier lives behind a [`Mutex`], so the
/// read-compare-update step of each generation is serialized. At most 32
/// identifiers are issued per millisecond; a caller beyond that rate waits for
/// the clock to tick, with the lock released, instead of receiving a duplicate
/// or an error.
///
/// ## Clock moving backward
///
/// If the time source reads earlier than the last issued timestamp, the
/// generator reports [`IdGenStatus::Pending`] for the difference and
/// [`next_id`](Self::next_id) waits until the clock catches up. Identifiers
/// from one generator are therefore strictly increasing even across a
/// backward wall-clock step, at the cost of stalling for the size of the step.
///
/// ## Timestamp exhaustion
///
/// The timestamp field holds 41 bits, about 69 years past the epoch. A time
/// source reading beyond that saturates at [`FlakeId::max_timestamp`]: the
/// last 32 identifiers of that millisecond are issued and the generator then
/// stays pending until [`interrupt`](Self::interrupt)ed. It never wraps to a
/// smaller timestamp.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Bounded throughput: blocks rather than duplicating
/// - ✅ Interruptible for graceful shutdown
#[derive(Debug)]
pub struct LockFlakeGenerator<T>
where
    T: TimeSource,
{
    state: Mutex<Option<FlakeId>>,
    origin: Origin,
    time: T,
    waiter: Waiter,
}

impl<T> LockFlakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a new [`LockFlakeGenerator`] that has not issued anything yet.
    ///
    /// # Parameters
    ///
    /// - `origin`: The fixed node/process identity encoded into every
    ///   generated ID.
    /// - `time`: A [`TimeSource`] implementation (e.g., [`WallClock`]) that
    ///   determines how timestamps are generated.
    ///
    /// # Example
    /// ```
    /// use flakekey::{LockFlakeGenerator, Origin, WallClock};
    ///
    /// let generator = LockFlakeGenerator::new(Origin::from_parts(1, 2), WallClock::default());
    /// let a = generator.next_id().unwrap();
    /// let b = generator.next_id().unwrap();
    /// assert!(a < b);
    /// ```
    ///
    /// [`WallClock`]: crate::WallClock
    pub fn new(origin: Origin, time: T) -> Self {
        Self::with_state(None, origin, time)
    }

    /// Creates a generator whose last issued identifier is given explicitly.
    ///
    /// This constructor is primarily useful for restoring state or for
    /// controlling the starting point of the generator in tests.
    ///
    /// # Parameters
    /// - `timestamp`: The last issued timestamp (ms since the epoch)
    /// - `origin`: The node/process identity
    /// - `sequence`: The last issued sequence number
    /// - `time`: A [`TimeSource`] implementation used to fetch the current
    ///   time
    ///
    /// # ⚠️ Note
    /// In typical use cases, you should prefer [`Self::new`].
    pub fn from_components(timestamp: u64, origin: Origin, sequence: u64, time: T) -> Self {
        let id = FlakeId::from_components(timestamp, origin, sequence);
        Self::with_state(Some(id), origin, time)
    }

    fn with_state(last: Option<FlakeId>, origin: Origin, time: T) -> Self {
        Self {
            state: Mutex::new(last),
            origin,
            time,
            waiter: Waiter::default(),
        }
    }

    /// The origin encoded into every identifier of this generator.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// The time source timestamps are read from.
    pub fn time(&self) -> &T {
        &self.time
    }

    /// Attempts to generate the next available ID without blocking.
    ///
    /// # Returns
    /// - `Ok(IdGenStatus::Ready { id })`: A new ID is available
    /// - `Ok(IdGenStatus::Pending { yield_for })`: The time to wait (in
    ///   milliseconds) before trying again
    ///
    /// # Errors
    /// - Returns [`Error::LockPoisoned`] if the state lock has been poisoned
    ///   (never with the `parking-lot` feature).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };
        // Read under the lock so a caller never compares against a timestamp
        // issued after its own reading.
        let mut now = self.time.current_millis();
        if now > FlakeId::max_timestamp() {
            now = Self::cold_timestamp_exhausted(now);
        }

        let Some(last) = *state else {
            let id = FlakeId::from_components(now, self.origin, 0);
            *state = Some(id);
            return Ok(IdGenStatus::Ready { id });
        };

        let current_ts = last.timestamp();
        match now.cmp(&current_ts) {
            Ordering::Equal => {
                if last.has_sequence_room() {
                    let id = last.increment_sequence();
                    *state = Some(id);
                    Ok(IdGenStatus::Ready { id })
                } else {
                    Ok(IdGenStatus::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => {
                let id = last.rollover_to_timestamp(now);
                *state = Some(id);
                Ok(IdGenStatus::Ready { id })
            }
            Ordering::Less => Ok(Self::cold_clock_behind(now, current_ts)),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, current_ts: u64) -> IdGenStatus {
        let yield_for = current_ts - now;
        #[cfg(feature = "tracing")]
        tracing::debug!(now, current_ts, yield_for, "clock behind last issued timestamp");
        IdGenStatus::Pending { yield_for }
    }

    #[cold]
    #[inline(never)]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn cold_timestamp_exhausted(now: u64) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, max = FlakeId::max_timestamp(), "timestamp field exhausted");
        FlakeId::max_timestamp()
    }

    /// Generates the next ID, blocking while the generator is pending.
    ///
    /// The wait happens without holding the state lock, so other callers keep
    /// making progress once the clock advances. There is no timeout.
    ///
    /// # Errors
    /// - [`Error::Interrupted`] once [`interrupt`](Self::interrupt) has been
    ///   called, including for callers already waiting.
    /// - [`Error::LockPoisoned`] if the state lock has been poisoned.
    pub fn next_id(&self) -> Result<FlakeId> {
        loop {
            if self.waiter.is_interrupted() {
                return Err(Error::Interrupted);
            }
            match self.try_poll_id()? {
                IdGenStatus::Ready { id } => return Ok(id),
                IdGenStatus::Pending { yield_for } => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(yield_for, "generator pending");
                    self.waiter.wait_for(Duration::from_millis(yield_for));
                }
            }
        }
    }

    /// Returns an unbounded iterator over freshly generated IDs.
    ///
    /// The iterator ends only when the generator is interrupted or its lock is
    /// poisoned.
    ///
    /// ```
    /// use flakekey::{LockFlakeGenerator, Origin, WallClock};
    ///
    /// let generator = LockFlakeGenerator::new(Origin::from_parts(0, 0), WallClock::default());
    /// let ids: Vec<_> = generator.iter().take(100).collect();
    /// assert!(ids.windows(2).all(|w| w[0] < w[1]));
    /// ```
    pub fn iter(&self) -> FlakeIter<'_, T> {
        FlakeIter { generator: self }
    }

    /// Stops the generator.
    ///
    /// Every caller blocked in [`next_id`](Self::next_id) wakes and returns
    /// [`Error::Interrupted`], as does every later call. Non-blocking
    /// [`try_poll_id`](Self::try_poll_id) is unaffected.
    pub fn interrupt(&self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(origin = self.origin.to_raw(), "generator interrupted");
        self.waiter.interrupt();
    }

    /// Returns `true` once [`interrupt`](Self::interrupt) has been called.
    pub fn is_interrupted(&self) -> bool {
        self.waiter.is_interrupted()
    }
}

/// Unbounded iterator of identifiers, created by [`LockFlakeGenerator::iter`].
#[derive(Debug)]
pub struct FlakeIter<'a, T>
where
    T: TimeSource,
{
    generator: &'a LockFlakeGenerator<T>,
}

impl<T> Iterator for FlakeIter<'_, T>
where
    T: TimeSource,
{
    type Item = FlakeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.generator.next_id().ok()
    }
}

impl<'a, T> IntoIterator for &'a LockFlakeGenerator<T>
where
    T: TimeSource,
{
    type Item = FlakeId;
    type IntoIter = FlakeIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
