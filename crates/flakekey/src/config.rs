use core::time::Duration;

use crate::{FLAKEKEY_EPOCH, LockFlakeGenerator, Origin, WallClock};

/// Generator settings, read once at process start.
///
/// Absent overrides fall back to the platform-derived defaults of
/// [`Origin::resolve`].
///
/// A configuration builds the wall-clock generator of a process only through
/// [`process_generator`](crate::process_generator), so one process never
/// holds two generators for the same origin:
///
/// ```compile_fail
/// use flakekey::Config;
///
/// let second = Config::default().build_generator();
/// ```
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Node ID override. Only the low 10 bits are used.
    pub node_id: Option<u64>,
    /// Process ID override. Only the low 5 bits are used.
    pub process_id: Option<u64>,
    /// Reference instant for timestamps, as a duration since 1970-01-01 UTC.
    pub epoch: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_id: None,
            process_id: None,
            epoch: FLAKEKEY_EPOCH,
        }
    }
}

impl Config {
    /// Resolves the origin described by this configuration.
    pub fn resolve_origin(&self) -> Origin {
        Origin::resolve(self.node_id, self.process_id)
    }

    /// The wall clock aligned to the configured epoch.
    pub fn clock(&self) -> WallClock {
        WallClock::with_epoch(self.epoch)
    }

    /// Builds the generator installed by
    /// [`process_generator`](crate::process_generator).
    pub(crate) fn build_generator(&self) -> LockFlakeGenerator<WallClock> {
        LockFlakeGenerator::new(self.resolve_origin(), self.clock())
    }
}
