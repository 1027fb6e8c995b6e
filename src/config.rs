use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer_pool::{buffer_pool, BufferPool};
use crate::commit::{Committer, WriteCommitter};
use crate::error::ConfigError;
use crate::format::{Formatter, JsonFormatter, TextFormatter};
use crate::handle::{Env, Exiter, Handle, Logger};
use crate::handle_pool::{HandlePool, DEFAULT_POOL_SIZE};
use crate::record::Record;
use crate::severity::Severity;
use crate::sink::Sink;

/// Builder for a [`Logger`].
///
/// Everything not set explicitly gets a default: stdout sink, text formatter,
/// write committer, `process::exit` as exit function, minimum level `info`,
/// a pool of 100 handles and the shared buffer pool.
///
/// # Examples
///
/// ```
/// # use chainlog::{Config, SharedBuffer, Severity};
/// let out = SharedBuffer::new();
/// let logger = Config::new("billing")
///     .level(Severity::Debug)
///     .pool_size(8)
///     .json()
///     .sink(out.clone())
///     .build();
///
/// logger.debug_level().print("ready");
/// assert!(out.contents_string().starts_with(r#"{"Domain":"billing","Priority":"debug""#));
/// ```
pub struct Config {
    domain: String,
    pool_size: usize,
    level: Severity,
    call_site: bool,
    colors: bool,
    buffer_capacity: Option<usize>,
    sink: Option<Box<dyn Sink>>,
    formatter: Option<Box<dyn Formatter>>,
    committer: Option<Box<dyn Committer>>,
    exiter: Option<Exiter>,
}

impl Config {
    /// Starts a configuration for `domain`. An empty domain falls back to
    /// [`DEFAULT_DOMAIN`](crate::DEFAULT_DOMAIN).
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            pool_size: DEFAULT_POOL_SIZE,
            level: Severity::Info,
            call_site: false,
            colors: false,
            buffer_capacity: None,
            sink: None,
            formatter: None,
            committer: None,
            exiter: None,
        }
    }

    /// Reads a configuration from the process environment.
    ///
    /// | Variable | Meaning |
    /// |---|---|
    /// | `CHAINLOG_DOMAIN` | domain |
    /// | `CHAINLOG_LEVEL` | minimum severity token |
    /// | `CHAINLOG_FORMAT` | `text` or `json` |
    /// | `CHAINLOG_POOL_SIZE` | number of pooled handles |
    /// | `CHAINLOG_COLORS` | `1`/`true` to color messages |
    /// | `CHAINLOG_CALL_SITE` | `1`/`true` to add file:line |
    /// | `CHAINLOG_FILE` | append to this file instead of stdout |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::new(lookup("CHAINLOG_DOMAIN").unwrap_or_default());

        if let Some(level) = lookup("CHAINLOG_LEVEL") {
            let level = level.parse().map_err(|source| ConfigError::Level {
                var: "CHAINLOG_LEVEL",
                source,
            })?;
            config = config.level(level);
        }

        if let Some(format) = lookup("CHAINLOG_FORMAT") {
            match format.as_str() {
                "text" => {}
                "json" => config = config.json(),
                _ => return Err(ConfigError::Format(format)),
            }
        }

        if let Some(size) = lookup("CHAINLOG_POOL_SIZE") {
            let size = size
                .parse()
                .map_err(|_| ConfigError::PoolSize(size.clone()))?;
            config = config.pool_size(size);
        }

        config = config
            .colors(lookup("CHAINLOG_COLORS").is_some_and(|v| is_truthy(&v)))
            .call_site(lookup("CHAINLOG_CALL_SITE").is_some_and(|v| is_truthy(&v)));

        if let Some(path) = lookup("CHAINLOG_FILE") {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| ConfigError::OpenFile(path.clone(), err))?;
            config = config.sink(file);
        }

        Ok(config)
    }

    /// Number of handles created up front.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Minimum severity a record needs to be emitted.
    pub fn level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    /// Whether records carry the emitting call's file and line by default.
    pub fn call_site(mut self, enabled: bool) -> Self {
        self.call_site = enabled;
        self
    }

    /// Colors messages of the default text formatter.
    pub fn colors(mut self, enabled: bool) -> Self {
        self.colors = enabled;
        self
    }

    /// Gives the logger its own buffer pool with this initial capacity.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    /// Uses the [`JsonFormatter`].
    pub fn json(self) -> Self {
        self.formatter(JsonFormatter)
    }

    pub fn committer(mut self, committer: impl Committer + 'static) -> Self {
        self.committer = Some(Box::new(committer));
        self
    }

    /// Function fatal calls use to end the process.
    pub fn exiter<F>(mut self, exiter: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.exiter = Some(Arc::new(exiter));
        self
    }

    /// Builds the logger and fills its handle pool.
    pub fn build(self) -> Logger {
        self.into_handle().freeze()
    }

    pub(crate) fn into_handle(self) -> Handle {
        let formatter: Box<dyn Formatter> = match self.formatter {
            Some(formatter) => formatter,
            None => Box::new(TextFormatter::with_colors(self.colors)),
        };
        let committer: Arc<dyn Committer> = match self.committer {
            Some(committer) => Arc::from(committer),
            None => Arc::new(WriteCommitter),
        };
        let sink: Box<dyn Sink> = match self.sink {
            Some(sink) => sink,
            None => Box::new(io::stdout()),
        };
        let buffers = match self.buffer_capacity {
            Some(capacity) => Arc::new(BufferPool::new(capacity)),
            None => buffer_pool(),
        };
        let exiter: Exiter = match self.exiter {
            Some(exiter) => exiter,
            None => Arc::new(exit_process),
        };

        let mut record = Record::new(self.domain.as_bytes());
        record.set_want_call_site(self.call_site);
        let env = Arc::new(Env {
            formatter,
            committer,
            sink: Arc::new(Mutex::new(sink)),
            pool: HandlePool::new(record.domain(), self.pool_size),
            pool_size: self.pool_size,
            buffers,
        });
        Handle::new(env, self.level, exiter, record)
    }
}

fn exit_process(code: i32) {
    std::process::exit(code)
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "yes" | "on")
}
