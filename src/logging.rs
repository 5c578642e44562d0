use sms_core::SmsError;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl std::str::FromStr for LogFormat {
    type Err = SmsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(SmsError::Configuration(format!(
                "unknown log format '{other}', expected json or pretty"
            ))),
        }
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level` when set. Fails if a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<(), SmsError> {
    let format: LogFormat = config.format.parse()?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| SmsError::Configuration(format!("invalid log level '{}': {e}", config.level)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_target(false))
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };
    installed.map_err(|e| SmsError::Configuration(format!("cannot install subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(SmsError::Configuration(_))
        ));
    }

    #[test]
    fn unknown_format_fails_before_installing() {
        let cfg = LoggingConfig {
            level: "info".into(),
            format: "xml".into(),
        };
        assert!(init(&cfg).is_err());
    }

    #[test]
    fn second_install_is_rejected() {
        let cfg = LoggingConfig::default();
        let _ = init(&cfg);
        assert!(matches!(init(&cfg), Err(SmsError::Configuration(_))));
    }
}
