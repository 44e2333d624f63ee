use core::time::Duration;
use std::sync::{
    Condvar, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

/// Timed, interruptible suspension for callers waiting on the clock.
#[derive(Debug, Default)]
pub(crate) struct Waiter {
    interrupted: AtomicBool,
    lock: Mutex<()>,
    cvar: Condvar,
}

impl Waiter {
    /// Blocks for up to `dur`, returning early once interrupted.
    pub(crate) fn wait_for(&self, dur: Duration) {
        let guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = self
            .cvar
            .wait_timeout_while(guard, dur, |_| !self.is_interrupted())
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Wakes every waiter; all later waits return immediately.
    pub(crate) fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
        // Taking the lock orders the store before any waiter's predicate check.
        drop(self.lock.lock().unwrap_or_else(PoisonError::into_inner));
        self.cvar.notify_all();
    }

    pub(crate) fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn wait_times_out() {
        let waiter = Waiter::default();
        let start = Instant::now();
        waiter.wait_for(Duration::from_millis(5));
        assert!(start.elapsed() >= Duration::from_millis(5));
        assert!(!waiter.is_interrupted());
    }

    #[test]
    fn interrupt_wakes_waiters() {
        let waiter = Waiter::default();
        let start = Instant::now();
        std::thread::scope(|s| {
            s.spawn(|| waiter.wait_for(Duration::from_secs(60)));
            std::thread::sleep(Duration::from_millis(10));
            waiter.interrupt();
        });
        assert!(start.elapsed() < Duration::from_secs(60));
        assert!(waiter.is_interrupted());

        // Later waits do not block at all.
        waiter.wait_for(Duration::from_secs(60));
    }
}
