pub mod timer;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the log subscriber shared by the binaries. `RUST_LOG` overrides
/// the default `file_zipper=info` filter.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_zipper=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
