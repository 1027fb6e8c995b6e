//! Routes records from the `log` facade through a [`Logger`].
//!
//! The `log` level maps onto a severity (`Warn` has no counterpart and becomes
//! `error`), the record's target is appended to the logger's tags and, when
//! the logger wants call-site info, the file and line reported by the `log`
//! macro are used.

use log::{LevelFilter, Metadata, SetLoggerError};

use crate::handle::Logger;
use crate::record::CallSite;
use crate::severity::Severity;

/// A `log::Log` implementation backed by a frozen logger.
#[derive(Debug, Clone)]
pub struct LogBridge {
    logger: Logger,
}

impl LogBridge {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Most verbose `log` level this bridge lets through.
    pub fn max_level(&self) -> LevelFilter {
        match self.logger.level() {
            Severity::Protocol => LevelFilter::Trace,
            Severity::Debug => LevelFilter::Debug,
            Severity::Info => LevelFilter::Info,
            Severity::Error | Severity::Fatal | Severity::Panic => LevelFilter::Error,
            Severity::NoPriority => LevelFilter::Off,
        }
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        Severity::from(metadata.level()) >= self.logger.level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut handle = self
            .logger
            .add_tags([record.target().to_owned()])
            .severity(record.level().into());
        if let (Some(file), Some(line)) = (record.file_static(), record.line()) {
            handle = handle.at(CallSite::new(file, line, 0));
        }
        handle.printf(*record.args());
    }

    fn flush(&self) {}
}

/// Installs a [`LogBridge`] for `logger` as the global `log` logger.
pub fn init(logger: Logger) -> Result<(), SetLoggerError> {
    let bridge = LogBridge::new(logger);
    log::set_max_level(bridge.max_level());
    log::set_boxed_logger(Box::new(bridge))
}
