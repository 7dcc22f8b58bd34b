use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::core::configuration::LoggingConfiguration;

const DEFAULT_LEVEL: &str = "info";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(configuration: Option<&LoggingConfiguration>) {
    let level = configuration
        .and_then(|c| c.level.as_deref())
        .unwrap_or(DEFAULT_LEVEL);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("logging already initialized: {err}");
    }
}
