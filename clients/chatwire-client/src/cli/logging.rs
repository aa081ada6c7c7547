//! Tracing subscriber setup shared by the binaries

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use super::config::{LogFormat, LoggingConfig};

/// Install the global subscriber. Logs go to stderr so they do not mix
/// with the chat on stdout. `RUST_LOG` wins over the configured level.
pub fn init_logging(logging: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match logging.format {
        LogFormat::Pretty => {
            let subscriber = builder.with_file(true).with_line_number(true).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = builder.compact().finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = builder.json().finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
