/// Emits a formatted record at the handle's current severity.
///
/// With a leading format literal the record goes through the default logger;
/// otherwise the first argument is a [`Logger`](crate::Logger) or
/// [`Handle`](crate::Handle) expression.
///
/// # Examples
///
/// ```
/// # use chainlog::{log_print, Config, SharedBuffer};
/// let out = SharedBuffer::new();
/// let logger = Config::new("app").sink(out.clone()).build();
///
/// log_print!(logger.tag(["net"]), "listening on {}:{}", "0.0.0.0", 8080);
/// assert!(out.contents_string().ends_with(" - net - listening on 0.0.0.0:8080\n"));
/// ```
#[macro_export]
macro_rules! log_print {
    ($fmt:literal $($arg:tt)*) => {
        $crate::printf(::std::format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.printf(::std::format_args!($($arg)+))
    };
}

/// Emits a formatted record at `error` severity.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::errorf(::std::format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(::std::format_args!($($arg)+))
    };
}

/// Emits a formatted `fatal` record, closes the sink and calls the exit
/// function.
#[macro_export]
macro_rules! log_fatal {
    ($fmt:literal $($arg:tt)*) => {
        $crate::fatalf(::std::format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(::std::format_args!($($arg)+))
    };
}

/// Emits a formatted `panic` record and panics with the message.
#[macro_export]
macro_rules! log_panic {
    ($fmt:literal $($arg:tt)*) => {
        $crate::panicf(::std::format_args!($fmt $($arg)*))
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.panicf(::std::format_args!($($arg)+))
    };
}
