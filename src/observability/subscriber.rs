//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Pick the filter directive: an explicit override, then `RUST_LOG`, then
/// the configured level.
pub fn filter_directive(
    config: &LoggingConfig,
    level_override: Option<&str>,
    rust_log: Option<&str>,
) -> String {
    level_override
        .or(rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or(config.level.as_str())
        .to_string()
}

/// Install a fmt subscriber.
///
/// An invalid directive falls back to the configured level. Returns false
/// when a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig, level_override: Option<&str>) -> bool {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(config, level_override, rust_log.as_deref());
    let env_filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        let config = LoggingConfig {
            level: "warn".to_string(),
        };
        assert_eq!(filter_directive(&config, None, None), "warn");
        assert_eq!(filter_directive(&config, None, Some("")), "warn");
        assert_eq!(filter_directive(&config, None, Some("trace")), "trace");
        assert_eq!(
            filter_directive(&config, Some("docsite=debug"), None),
            "docsite=debug"
        );
    }

    #[test]
    fn test_override_beats_rust_log() {
        let config = LoggingConfig {
            level: "warn".to_string(),
        };
        assert_eq!(filter_directive(&config, Some("debug"), Some("error")), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        init_tracing(&config, None);
        assert!(!init_tracing(&config, None));
    }
}
