use std::io::{self, Write};
use std::process;

use chainlog::Config;
use tracing_subscriber::EnvFilter;

/// Logs every line read from stdin as one record.
///
/// The logger is configured from the `CHAINLOG_*` environment variables;
/// internal diagnostics go to stderr, filtered by `RUST_LOG`.
fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let logger = match Config::from_env() {
        Ok(config) => config.build(),
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            process::exit(2);
        }
    };

    let mut writer = logger.writer();
    io::copy(&mut io::stdin().lock(), &mut writer)?;
    writer.flush()?;
    drop(writer);

    logger.close()
}
