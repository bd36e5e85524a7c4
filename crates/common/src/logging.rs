//! Logging setup and configuration
//!
//! Diagnostics are written to stderr so that stdout stays a clean stream of
//! measurement lines.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Accepted log level names
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check that a level name is one of [`LOG_LEVELS`]
pub fn validate_log_level(level: &str) -> crate::Result<()> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(crate::Error::Config(format!(
            "Invalid log level '{}', must be one of: {}",
            level,
            LOG_LEVELS.join(", ")
        )))
    }
}

/// Setup tracing subscriber for the application
///
/// `RUST_LOG` takes precedence over `default_level` when set.
pub fn setup_logging(default_level: &str) -> crate::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| crate::Error::Config(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| crate::Error::Logging(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_log_level() {
        for level in LOG_LEVELS {
            assert!(validate_log_level(level).is_ok());
        }
        assert!(validate_log_level("verbose").is_err());
        assert!(validate_log_level("INFO").is_err());
    }

    #[test]
    fn test_invalid_level_message_lists_choices() {
        let err = validate_log_level("loud").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("loud"));
        assert!(msg.contains("trace, debug, info, warn, error"));
    }
}
