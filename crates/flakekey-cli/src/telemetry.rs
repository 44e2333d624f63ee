//! Log output for the binary.
//!
//! Events go to stderr through `tracing-subscriber`'s fmt layer so stdout
//! carries nothing but keys. Verbosity follows `RUST_LOG` and defaults to
//! `info`; `RUST_LOG=flakekey=trace` shows every stalled generation attempt.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}
