use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::io;
use std::mem;
use std::panic::{self, Location, UnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::buffer_pool::BufferPool;
use crate::commit::{report, Committer, Output};
use crate::error::Failure;
use crate::format::Formatter;
use crate::handle_pool::HandlePool;
use crate::panic_trace;
use crate::record::{CallSite, Record};
use crate::severity::Severity;
use crate::sink::Sink;
use crate::writer::LogWriter;

/// Predicate deciding whether a handle's record is emitted.
pub type Filter = Arc<dyn Fn(&Handle) -> bool + Send + Sync>;

/// Function called with exit code 1 by fatal calls.
pub type Exiter = Arc<dyn Fn(i32) + Send + Sync>;

/// State shared by every handle of one logger.
///
/// Loggers derived with another formatter share the committer, sink and
/// buffers but get their own handle pool.
pub(crate) struct Env {
    pub(crate) formatter: Box<dyn Formatter>,
    pub(crate) committer: Arc<dyn Committer>,
    pub(crate) sink: Arc<Mutex<Box<dyn Sink>>>,
    pub(crate) pool: HandlePool,
    pub(crate) pool_size: usize,
    pub(crate) buffers: Arc<BufferPool>,
}

impl Env {
    fn with_formatter(&self, formatter: Box<dyn Formatter>, domain: &[u8]) -> Self {
        Self {
            formatter,
            committer: Arc::clone(&self.committer),
            sink: Arc::clone(&self.sink),
            pool: HandlePool::new(domain, self.pool_size),
            pool_size: self.pool_size,
            buffers: Arc::clone(&self.buffers),
        }
    }

    pub(crate) fn close_sink(&self) -> io::Result<()> {
        self.sink.lock().close()
    }

    fn close_sink_reporting(&self) {
        if let Err(err) = self.close_sink() {
            report("closing sink failed", &err);
        }
    }
}

/// A private, chainable view of a logger for one record.
///
/// A `Handle` is obtained from a [`Logger`] (every chain call on a logger
/// takes a recycled handle from the logger's pool and copies the logger's
/// configuration into it) and is consumed by a terminal call. Chain calls on
/// a handle mutate it in place, so building a record allocates nothing beyond
/// what the pooled record already holds.
///
/// Dropping a handle, emitting it, or having its record filtered out all
/// return the record to the pool.
///
/// # Thread Safety
///
/// A handle is `Send` but is owned by exactly one call chain. Sharing happens
/// through [`Logger`], which is immutable.
///
/// # Examples
///
/// ```
/// # use chainlog::{Config, SharedBuffer, Severity};
/// let out = SharedBuffer::new();
/// let logger = Config::new("app").sink(out.clone()).build();
///
/// logger
///     .tag(["db"])
///     .error_level()
///     .printf(format_args!("query took {}ms", 1200));
///
/// assert!(out.contents_string().ends_with(" - error - db - query took 1200ms\n"));
/// ```
pub struct Handle {
    env: Arc<Env>,
    level: Severity,
    filter: Option<Filter>,
    exiter: Exiter,
    record: Record,
}

impl Handle {
    pub(crate) fn new(env: Arc<Env>, level: Severity, exiter: Exiter, record: Record) -> Self {
        Self {
            env,
            level,
            filter: None,
            exiter,
            record,
        }
    }

    /// Minimum severity a record needs to be emitted.
    pub fn level(&self) -> Severity {
        self.level
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn domain(&self) -> &[u8] {
        self.record.domain()
    }

    /// Replaces the record's tags.
    pub fn tag<I, T>(mut self, tags: I) -> Handle
    where
        I: IntoIterator<Item = T>,
        T: Into<Cow<'static, str>>,
    {
        self.record.tags_mut().replace(tags);
        self
    }

    /// Appends to the record's tags.
    pub fn add_tags<I, T>(mut self, tags: I) -> Handle
    where
        I: IntoIterator<Item = T>,
        T: Into<Cow<'static, str>>,
    {
        self.record.tags_mut().add(tags);
        self
    }

    /// Adds the emitting call's file and line to the record.
    pub fn di(mut self) -> Handle {
        self.record.set_want_call_site(true);
        self
    }

    /// Removes call-site information from the record.
    pub fn no_di(mut self) -> Handle {
        self.record.set_want_call_site(false);
        self
    }

    /// Sets the severity of the next record.
    pub fn severity(mut self, severity: Severity) -> Handle {
        self.record.set_severity(severity);
        self
    }

    pub fn proto_level(self) -> Handle {
        self.severity(Severity::Protocol)
    }

    pub fn debug_level(self) -> Handle {
        self.severity(Severity::Debug)
    }

    pub fn info_level(self) -> Handle {
        self.severity(Severity::Info)
    }

    pub fn error_level(self) -> Handle {
        self.severity(Severity::Error)
    }

    /// Sets the minimum severity a record needs to be emitted.
    pub fn set_level(mut self, level: Severity) -> Handle {
        self.level = level;
        self
    }

    /// Installs a filter; records for which it returns false are dropped.
    pub fn filter<F>(mut self, filter: F) -> Handle
    where
        F: Fn(&Handle) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Replaces the function fatal calls use to end the process.
    pub fn exiter<F>(mut self, exiter: F) -> Handle
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.exiter = Arc::new(exiter);
        self
    }

    /// Pins the call site reported for this record.
    pub(crate) fn at(mut self, site: CallSite) -> Handle {
        self.record.resolve_call_site(site);
        self
    }

    /// Publishes this handle as an immutable [`Logger`].
    ///
    /// Chain calls on the returned logger never touch this configuration
    /// again; each one starts from a private copy.
    pub fn freeze(self) -> Logger {
        Logger {
            frozen: Arc::new(self),
        }
    }

    /// Same as [`Handle::freeze`].
    pub fn make_default(self) -> Logger {
        self.freeze()
    }

    #[track_caller]
    pub fn print(self, message: impl fmt::Display) {
        self.printf(format_args!("{message}"));
    }

    #[track_caller]
    pub fn printf(mut self, args: fmt::Arguments<'_>) {
        self.record.resolve_call_site(Location::caller().into());
        self.record.set_message(args);
        self.commit();
    }

    #[track_caller]
    pub fn println(self, message: impl fmt::Display) {
        self.printf(format_args!("{message}\n"));
    }

    #[track_caller]
    pub fn error(self, message: impl fmt::Display) {
        self.severity(Severity::Error).printf(format_args!("{message}"));
    }

    #[track_caller]
    pub fn errorf(self, args: fmt::Arguments<'_>) {
        self.severity(Severity::Error).printf(args);
    }

    #[track_caller]
    pub fn errorln(self, message: impl fmt::Display) {
        self.severity(Severity::Error).printf(format_args!("{message}\n"));
    }

    /// Emits a fatal record, closes the sink and calls the exit function with
    /// code 1.
    ///
    /// The record is written before the exit function runs. With the default
    /// exit function this never returns; with a custom one it returns once the
    /// function does.
    #[track_caller]
    pub fn fatal(self, message: impl fmt::Display) {
        self.fatalf(format_args!("{message}"));
    }

    #[track_caller]
    pub fn fatalf(self, args: fmt::Arguments<'_>) {
        let env = Arc::clone(&self.env);
        let exiter = Arc::clone(&self.exiter);
        self.severity(Severity::Fatal).printf(args);
        env.close_sink_reporting();
        exiter(1);
    }

    #[track_caller]
    pub fn fatalln(self, message: impl fmt::Display) {
        self.fatalf(format_args!("{message}\n"));
    }

    /// Emits a panic record, closes the sink and panics with the message.
    ///
    /// The panic payload is the message as a `String`, without any of the
    /// record's metadata.
    #[track_caller]
    pub fn panic(self, message: impl fmt::Display) -> ! {
        self.panicf(format_args!("{message}"))
    }

    #[track_caller]
    pub fn panicf(self, args: fmt::Arguments<'_>) -> ! {
        self.raise(args, false)
    }

    /// Like [`Handle::panic`] with a newline-terminated record. The payload is
    /// the message without the newline.
    #[track_caller]
    pub fn panicln(self, message: impl fmt::Display) -> ! {
        self.raise(format_args!("{message}\n"), true)
    }

    #[track_caller]
    fn raise(mut self, args: fmt::Arguments<'_>, line: bool) -> ! {
        self.record.set_message(args);
        let message = if line {
            self.record.message_line().to_owned()
        } else {
            self.record.message().to_owned()
        };
        let env = Arc::clone(&self.env);
        self.record.set_severity(Severity::Panic);
        self.record.resolve_call_site(Location::caller().into());
        self.commit();
        env.close_sink_reporting();
        panic::panic_any(message)
    }

    /// Emits a panic record and returns it as an error value instead of
    /// unwinding.
    ///
    /// ```
    /// # use chainlog::{Config, SharedBuffer, Failure};
    /// fn load(logger: &chainlog::Logger) -> Result<(), Failure> {
    ///     Err(logger.fail("config missing"))
    /// }
    ///
    /// let out = SharedBuffer::new();
    /// let logger = Config::new("app").sink(out.clone()).build();
    /// let err = load(&logger).unwrap_err();
    /// assert_eq!(err.message(), "config missing");
    /// assert!(out.contents_string().contains(" - panic - config missing"));
    /// ```
    #[track_caller]
    pub fn fail(mut self, message: impl fmt::Display) -> Failure {
        self.record.set_message(format_args!("{message}"));
        let failure = Failure::new(self.record.message().to_owned());
        self.record.set_severity(Severity::Panic);
        self.record.resolve_call_site(Location::caller().into());
        self.commit();
        failure
    }

    /// Logs a caught panic at panic severity.
    ///
    /// The message is the payload text followed by the stack in braces. When
    /// `cont` is false the sink is closed and the exit function called.
    #[track_caller]
    pub fn log_panic(mut self, payload: &(dyn Any + Send), stack: &dyn fmt::Display, cont: bool) {
        let env = Arc::clone(&self.env);
        let exiter = Arc::clone(&self.exiter);
        self.record
            .set_message(format_args!("{}\n\n{{{}}}", payload_text(payload), stack));
        self.record.set_severity(Severity::Panic);
        self.record.resolve_call_site(Location::caller().into());
        self.commit();
        if !cont {
            env.close_sink_reporting();
            exiter(1);
        }
    }

    /// Runs `f`, logging a panic from it with the backtrace of the panicking
    /// call.
    ///
    /// Returns `None` when `f` panicked and `cont` allowed execution to go on.
    #[track_caller]
    pub fn recover<F, R>(self, cont: bool, f: F) -> Option<R>
    where
        F: FnOnce() -> R + UnwindSafe,
    {
        match panic_trace::catch(f) {
            Ok(value) => Some(value),
            Err((payload, stack)) => {
                self.log_panic(&*payload, &stack, cont);
                None
            }
        }
    }

    /// Runs the commit pipeline for the record as it stands.
    ///
    /// Records below the minimum level or rejected by the filter are dropped
    /// without reaching the committer. The handle goes back to the pool in
    /// every case.
    pub fn commit(mut self) {
        if self.record.severity() < self.level {
            return;
        }
        if let Some(filter) = &self.filter {
            if !filter(&self) {
                return;
            }
        }
        self.record.terminate_message();
        let env = &self.env;
        env.committer.commit(&mut self.record, &Output::new(env));
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        let record = mem::replace(&mut self.record, Record::empty());
        self.env.pool.put(record);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("level", &self.level)
            .field("filter", &self.filter.is_some())
            .field("record", &self.record)
            .finish()
    }
}

fn payload_text(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else if let Some(failure) = payload.downcast_ref::<Failure>() {
        failure.message()
    } else {
        "Box<dyn Any>"
    }
}

/// A frozen, shareable logger.
///
/// Cloning a `Logger` is a reference-count bump. Its configuration never
/// changes: every chain or terminal call starts from a fresh [`Handle`] taken
/// from the pool, so many threads can use one logger at once without seeing
/// each other's tags or severities.
///
/// # Examples
///
/// ```
/// # use chainlog::{Config, SharedBuffer, Severity};
/// let out = SharedBuffer::new();
/// let base = Config::new("app").sink(out.clone()).level(Severity::Debug).build();
///
/// // Derive a new default from the base without touching it
/// let db = base.tag(["db"]).make_default();
/// db.print("connected");
/// base.print("started");
///
/// let lines = out.lines();
/// assert!(lines[0].ends_with(" - info - db - connected"));
/// assert!(lines[1].ends_with(" - info - started"));
/// ```
#[derive(Clone)]
pub struct Logger {
    frozen: Arc<Handle>,
}

impl Logger {
    pub(crate) fn from_shared(frozen: Arc<Handle>) -> Self {
        Self { frozen }
    }

    pub(crate) fn shared(&self) -> Arc<Handle> {
        Arc::clone(&self.frozen)
    }

    /// Takes a handle from the pool carrying a private copy of this logger's
    /// configuration and record template.
    pub fn handle(&self) -> Handle {
        let frozen = &*self.frozen;
        let mut record = frozen.env.pool.get();
        record.copy_from(&frozen.record);
        Handle {
            env: Arc::clone(&frozen.env),
            level: frozen.level,
            filter: frozen.filter.clone(),
            exiter: Arc::clone(&frozen.exiter),
            record,
        }
    }

    pub fn level(&self) -> Severity {
        self.frozen.level
    }

    /// The record every handle of this logger starts from.
    pub fn template(&self) -> &Record {
        &self.frozen.record
    }

    pub fn domain(&self) -> &[u8] {
        self.frozen.record.domain()
    }

    /// Whether both loggers are the same frozen instance.
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.frozen, &other.frozen)
    }

    /// Number of idle handles in this logger's pool.
    pub fn idle_handles(&self) -> usize {
        self.frozen.env.pool.idle()
    }

    pub fn tag<I, T>(&self, tags: I) -> Handle
    where
        I: IntoIterator<Item = T>,
        T: Into<Cow<'static, str>>,
    {
        self.handle().tag(tags)
    }

    pub fn add_tags<I, T>(&self, tags: I) -> Handle
    where
        I: IntoIterator<Item = T>,
        T: Into<Cow<'static, str>>,
    {
        self.handle().add_tags(tags)
    }

    pub fn di(&self) -> Handle {
        self.handle().di()
    }

    pub fn no_di(&self) -> Handle {
        self.handle().no_di()
    }

    pub fn severity(&self, severity: Severity) -> Handle {
        self.handle().severity(severity)
    }

    pub fn proto_level(&self) -> Handle {
        self.handle().proto_level()
    }

    pub fn debug_level(&self) -> Handle {
        self.handle().debug_level()
    }

    pub fn info_level(&self) -> Handle {
        self.handle().info_level()
    }

    pub fn error_level(&self) -> Handle {
        self.handle().error_level()
    }

    pub fn set_level(&self, level: Severity) -> Handle {
        self.handle().set_level(level)
    }

    pub fn filter<F>(&self, filter: F) -> Handle
    where
        F: Fn(&Handle) -> bool + Send + Sync + 'static,
    {
        self.handle().filter(filter)
    }

    pub fn exiter<F>(&self, exiter: F) -> Handle
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.handle().exiter(exiter)
    }

    /// Returns a new frozen logger with this logger's configuration.
    pub fn make_default(&self) -> Logger {
        self.handle().freeze()
    }

    #[track_caller]
    pub fn print(&self, message: impl fmt::Display) {
        self.handle().print(message);
    }

    #[track_caller]
    pub fn printf(&self, args: fmt::Arguments<'_>) {
        self.handle().printf(args);
    }

    #[track_caller]
    pub fn println(&self, message: impl fmt::Display) {
        self.handle().println(message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.handle().error(message);
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.handle().errorf(args);
    }

    #[track_caller]
    pub fn errorln(&self, message: impl fmt::Display) {
        self.handle().errorln(message);
    }

    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.handle().fatal(message);
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.handle().fatalf(args);
    }

    #[track_caller]
    pub fn fatalln(&self, message: impl fmt::Display) {
        self.handle().fatalln(message);
    }

    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        self.handle().panic(message)
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) -> ! {
        self.handle().panicf(args)
    }

    #[track_caller]
    pub fn panicln(&self, message: impl fmt::Display) -> ! {
        self.handle().panicln(message)
    }

    #[track_caller]
    pub fn fail(&self, message: impl fmt::Display) -> Failure {
        self.handle().fail(message)
    }

    #[track_caller]
    pub fn log_panic(&self, payload: &(dyn Any + Send), stack: &dyn fmt::Display, cont: bool) {
        self.handle().log_panic(payload, stack, cont);
    }

    #[track_caller]
    pub fn recover<F, R>(&self, cont: bool, f: F) -> Option<R>
    where
        F: FnOnce() -> R + UnwindSafe,
    {
        match panic_trace::catch(f) {
            Ok(value) => Some(value),
            Err((payload, stack)) => {
                self.log_panic(&*payload, &stack, cont);
                None
            }
        }
    }

    /// Returns a new frozen logger formatting with `formatter`.
    ///
    /// Everything else is kept, including the sink: records of both loggers
    /// are written through the same lock.
    pub fn with_formatter(&self, formatter: impl Formatter + 'static) -> Logger {
        let frozen = &*self.frozen;
        let env = Arc::new(
            frozen
                .env
                .with_formatter(Box::new(formatter), frozen.record.domain()),
        );
        let mut record = Record::new(frozen.record.domain());
        record.copy_from(&frozen.record);
        let mut handle = Handle::new(env, frozen.level, Arc::clone(&frozen.exiter), record);
        handle.filter = frozen.filter.clone();
        handle.freeze()
    }

    /// An [`io::Write`] adapter logging every written line as one record.
    pub fn writer(&self) -> LogWriter {
        LogWriter::new(self.clone())
    }

    /// Closes the logger's sink.
    pub fn close(&self) -> io::Result<()> {
        self.frozen.env.close_sink()
    }
}

impl From<Handle> for Logger {
    fn from(handle: Handle) -> Self {
        handle.freeze()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("domain", &String::from_utf8_lossy(self.domain()))
            .field("level", &self.level())
            .finish()
    }
}
