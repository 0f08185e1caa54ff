//! Diagnostic tracing setup.
//!
//! Every module logs through `tracing`; nothing is printed unless the host
//! installs a subscriber. Hosts that have none can call [`init`].

use crate::config::MissionConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a compact stderr subscriber.
///
/// Reads `RUST_LOG`, falling back to [`MissionConfig::log_filter`].
/// Panics if a global subscriber is already installed.
pub fn init(config: &MissionConfig) {
    tracing_subscriber::registry()
        .with(filter(&config.log_filter))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

/// Like [`init`], but returns `false` instead of panicking when a
/// subscriber is already installed.
pub fn try_init(config: &MissionConfig) -> bool {
    tracing_subscriber::registry()
        .with(filter(&config.log_filter))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .is_ok()
}

fn filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let config = MissionConfig {
            log_filter: "sortie=debug".to_string(),
            ..MissionConfig::default()
        };
        let _ = try_init(&config);
        assert!(!try_init(&config));
    }

    #[test]
    fn configured_filter_is_used_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(filter("sortie=debug").to_string(), "sortie=debug");
    }
}
