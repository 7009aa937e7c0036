//! Tracing initialisation.
//!
//! Log output goes to stdout through the `tracing-subscriber` fmt layer. Verbosity is taken from
//! `RUST_LOG` and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=blogd=debug,tower_http=debug blogd -f config.yaml
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
