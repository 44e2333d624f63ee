use std::sync::{Arc, OnceLock};

use crate::{Config, LockFlakeGenerator, WallClock};

/// The generator type shared by a whole process.
pub type ProcessGenerator = LockFlakeGenerator<WallClock>;

static PROCESS_GENERATOR: OnceLock<(Config, Arc<ProcessGenerator>)> = OnceLock::new();

/// Returns the single generator of this process, constructing it on the
/// first call.
///
/// Call it once at startup and hand the returned [`Arc`] to whatever mints
/// keys; nothing else in this crate reads the shared instance. Two generators
/// with the same origin in one process would issue colliding identifiers, so
/// the first configuration wins: later calls return the same instance, and a
/// differing configuration is ignored (and logged at `warn` with the
/// `tracing` feature).
///
/// ```
/// use std::sync::Arc;
/// use flakekey::{process_generator, Config};
///
/// let a = process_generator(&Config::default());
/// let b = process_generator(&Config::default());
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub fn process_generator(config: &Config) -> Arc<ProcessGenerator> {
    let (installed, generator) = PROCESS_GENERATOR
        .get_or_init(|| (config.clone(), Arc::new(config.build_generator())));

    if installed != config {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            ?installed,
            requested = ?config,
            "process generator already initialized; ignoring new configuration"
        );
    }

    Arc::clone(generator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn first_construction_wins() {
        let first = process_generator(&Config {
            node_id: Some(11),
            process_id: Some(3),
            ..Config::default()
        });
        let second = process_generator(&Config {
            node_id: Some(12),
            process_id: Some(4),
            ..Config::default()
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.origin(), second.origin());

        let a = first.next_id().unwrap();
        let b = second.next_id().unwrap();
        assert!(a < b);
    }

    #[test]
    fn repeated_requests_never_collide() {
        let config = Config {
            node_id: Some(1),
            process_id: Some(1),
            ..Config::default()
        };
        let first = process_generator(&config);
        let second = process_generator(&config);

        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            assert!(seen.insert(first.next_id().unwrap()));
            assert!(seen.insert(second.next_id().unwrap()));
        }
        assert_eq!(seen.len(), 4_000);
    }
}
