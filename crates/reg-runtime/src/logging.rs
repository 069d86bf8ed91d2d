//! Tracing subscriber setup

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{LogConfig, LogFormat};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {source}")]
    Filter { filter: String, source: ParseError },

    #[error("tracing already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Build the filter: `RUST_LOG` when set, the configured directive otherwise
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|source| LoggingError::Filter {
        filter: config.filter.clone(),
        source,
    })
}

/// Install the global subscriber. Output goes to stderr.
pub fn init_tracing(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_filter_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LogConfig {
            format: LogFormat::Pretty,
            filter: "reg_sync=loud".into(),
        };
        assert!(matches!(
            build_filter(&config),
            Err(LoggingError::Filter { .. })
        ));
    }

    #[test]
    fn test_directive_accepted() {
        let config = LogConfig {
            format: LogFormat::Json,
            filter: "reg_sync=debug,info".into(),
        };
        assert!(build_filter(&config).is_ok());
    }
}
