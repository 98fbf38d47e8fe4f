//! Log subscriber setup for binaries and tests that embed the store.
//!
//! The library only emits `tracing` events; nothing is printed until a
//! subscriber is installed.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "warn";

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// [`DEFAULT_FILTER`]. Does nothing if a global subscriber already exists.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn repeated_init_is_harmless() {
        init();
        init();
        tracing::warn!("logging initialised twice");
    }
}
