//! Diagnostic logging.
//!
//! Installs a global `tracing` subscriber that writes to stderr, so stdout
//! carries only what the view prints. `RUST_LOG` wins over the configured
//! level when set.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Level used when `--verbose` is passed.
const VERBOSE_LEVEL: &str = "debug";

/// Picks the filter directive from the config level and the `--verbose` flag.
pub fn resolve_level(configured: &str, verbose: bool) -> &str {
    if verbose {
        VERBOSE_LEVEL
    } else {
        configured
    }
}

/// Builds the filter: a valid `rust_log` directive wins, else `level`.
fn build_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter> {
    if let Some(filter) = rust_log.and_then(|directive| EnvFilter::try_new(directive).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| anyhow!("invalid log level '{}': {}", level, e))
}

pub fn init(level: &str) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(rust_log.as_deref(), level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_config() {
        assert_eq!(resolve_level("warn", false), "warn");
        assert_eq!(resolve_level("warn", true), "debug");
    }

    #[test]
    fn test_bad_level_is_an_error() {
        let err = build_filter(None, "ragc=loud").unwrap_err();
        assert!(err.to_string().contains("invalid log level 'ragc=loud'"));
        assert!(build_filter(None, "info").is_ok());
    }

    #[test]
    fn test_rust_log_wins_over_config_level() {
        assert!(build_filter(Some("debug"), "ragc=loud").is_ok());
        // An unusable RUST_LOG falls back to the configured level.
        assert!(build_filter(Some("ragc=loud"), "warn").is_ok());
        assert!(build_filter(Some("ragc=loud"), "ragc=loud").is_err());
    }

    #[test]
    fn test_init_rejects_bad_level() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() {
            assert!(init("ragc=loud").is_err());
        }
    }
}
