//! Log subscriber setup for the binary and tests.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a stderr fmt subscriber filtered by `RUST_LOG`.
///
/// Without `RUST_LOG` the crate logs at `info`, or `debug` when `verbose` is
/// set. Calling it again after a subscriber is installed is a no-op.
pub fn init(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ev_load_sim={level},warn")));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
        tracing::info!("still logging after second init");
    }
}
