use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Installs the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// when a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.trim().to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::init_logging;
    use crate::config::{LogFormat, LoggingConfig};

    #[test]
    fn second_initialisation_is_a_noop() {
        let config = LoggingConfig { level: "debug".to_string(), format: LogFormat::Json };

        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
