//! # chainlog
//!
//! A structured logger built around chainable handles and object reuse.
//!
//! * **Chainable**: `logger.tag(["db"]).error_level().print("timeout")`
//! * **Low allocation**: records and format buffers are pooled and recycled
//! * **Safe to share**: a [`Logger`] is frozen; every chain works on a private
//!   [`Handle`] copied from it, so concurrent chains never see each other's
//!   tags or severities
//!
//! ## Main Components
//!
//! * [`Severity`]: ordered log levels, from `protocol` up to `panic`
//! * [`Tags`] and [`Record`]: the data of one log entry
//! * [`HandlePool`] and [`BufferPool`]: recycling of records and buffers
//! * [`Handle`] and [`Logger`]: the chainable API and its frozen form
//! * [`Committer`], [`Formatter`] and [`Sink`]: the emit pipeline
//! * [`Config`]: builder and environment configuration
//! * the free functions and `log_*!` macros: a process-wide default logger
//!
//! ## Quick Start
//!
//! ```
//! use chainlog::{Config, Severity, SharedBuffer};
//!
//! let out = SharedBuffer::new();
//! let logger = Config::new("payments")
//!     .level(Severity::Debug)
//!     .sink(out.clone())
//!     .build();
//!
//! logger.debug_level().print("starting");
//! logger.tag(["db", "retry"]).error("connection reset");
//!
//! let lines = out.lines();
//! assert!(lines[0].starts_with("payments - "));
//! assert!(lines[0].ends_with(" - debug - starting"));
//! assert!(lines[1].ends_with(" - error - db retry - connection reset"));
//! ```
//!
//! Fatal calls emit their record, close the sink and exit with status 1;
//! panic calls emit theirs, close the sink and unwind with the bare message.

#[macro_use]
mod macros;

pub mod bridge;
pub mod buffer_pool;
pub mod commit;
pub mod config;
pub mod error;
pub mod format;
pub mod global;
pub mod handle;
pub mod handle_pool;
mod panic_trace;
pub mod record;
pub mod severity;
pub mod sink;
pub mod tags;
pub mod writer;

pub use bridge::LogBridge;
pub use buffer_pool::BufferPool;
pub use commit::{Committer, Output, WriteCommitter};
pub use config::Config;
pub use error::{ConfigError, Failure, FormatError, SeverityError};
pub use format::{Formatter, JsonEntry, JsonFormatter, TextFormatter};
pub use global::{
    colors, debug_info, debug_level, default_logger, di, error, error_level, errorf, errorln,
    fail, fatal, fatalf, fatalln, info_level, log_panic, no_debug_info, no_di, panic, panicf,
    panicln, print, printf, println, proto_level, recover, set_default, set_exiter, set_level,
    set_output, tag,
};
pub use handle::{Exiter, Filter, Handle, Logger};
pub use handle_pool::HandlePool;
pub use record::{CallSite, Record, DEFAULT_DOMAIN};
pub use severity::Severity;
pub use sink::{SharedBuffer, Sink, WriterSink};
pub use tags::Tags;
pub use writer::LogWriter;
