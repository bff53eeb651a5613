//! Subscriber setup for the `checklist` binary
//!
//! Logs go to stderr so stdout stays clean for JSON output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default directive when neither `--log-level` nor `RUST_LOG` is set
pub const DEFAULT_FILTER: &str = "info";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Build the filter: explicit level, else `RUST_LOG`, else [`DEFAULT_FILTER`]
///
/// # Errors
/// Unparseable filter directive
pub fn build_filter(level: Option<&str>) -> anyhow::Result<EnvFilter> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(DEFAULT_FILTER)?,
        },
    };
    Ok(filter)
}

/// Install the global subscriber
///
/// # Errors
/// Bad filter directive, or a subscriber is already installed
pub fn init_logging(level: Option<&str>, format: LogFormat) -> anyhow::Result<()> {
    let filter = build_filter(level)?;
    match format {
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Text => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins() {
        let filter = build_filter(Some("checklist_engine=debug")).unwrap();
        assert_eq!(filter.to_string(), "checklist_engine=debug");
    }

    #[test]
    fn garbage_level_is_rejected() {
        assert!(build_filter(Some("checklist=loud")).is_err());
    }
}
