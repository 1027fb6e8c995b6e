//! Process-wide default logger.
//!
//! The default is a frozen [`Logger`] published through an atomic pointer
//! swap. Reconfiguring builds a new frozen logger and swaps it in; calls that
//! already loaded the previous one finish with its configuration, and no
//! caller ever sees a half-updated logger.
//!
//! Out of the box the default logs to stdout with domain
//! [`DEFAULT_DOMAIN`](crate::DEFAULT_DOMAIN), minimum level `debug` and
//! call-site info enabled.
//!
//! Prefer passing a [`Logger`] explicitly through your code and keep these
//! free functions for the outermost layer.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::UnwindSafe;
use std::sync::Arc;

use arc_swap::ArcSwap;
use lazy_static::lazy_static;

use crate::config::Config;
use crate::error::Failure;
use crate::format::TextFormatter;
use crate::handle::{Handle, Logger};
use crate::severity::Severity;

lazy_static! {
    static ref DEFAULT: ArcSwap<Handle> = ArcSwap::from_pointee(
        Config::new("")
            .level(Severity::Debug)
            .call_site(true)
            .into_handle()
    );
}

/// Returns the current default logger.
pub fn default_logger() -> Logger {
    Logger::from_shared(DEFAULT.load_full())
}

/// Publishes `logger` as the default.
pub fn set_default(logger: &Logger) {
    DEFAULT.store(logger.shared());
}

/// Replaces the default with a logger built from `config`.
pub fn set_output(config: Config) {
    set_default(&config.build());
}

fn update(f: impl Fn(Logger) -> Logger) {
    DEFAULT.rcu(|current| f(Logger::from_shared(Arc::clone(current))).shared());
}

/// Sets the default logger's minimum level.
pub fn set_level(level: Severity) {
    update(|logger| logger.set_level(level).freeze());
}

/// Sets the function the default logger's fatal calls use to exit.
pub fn set_exiter<F>(exiter: F)
where
    F: Fn(i32) + Send + Sync + 'static,
{
    let exiter = Arc::new(exiter);
    update(|logger| {
        let exiter = Arc::clone(&exiter);
        logger.exiter(move |code| exiter(code)).freeze()
    });
}

/// Enables call-site info for every record of the default logger.
pub fn debug_info() {
    update(|logger| logger.di().freeze());
}

/// Disables call-site info for every record of the default logger.
pub fn no_debug_info() {
    update(|logger| logger.no_di().freeze());
}

/// Switches the default logger to the text layout, with or without colored
/// messages. Sink, level and the rest of the configuration are kept.
pub fn colors(enabled: bool) {
    update(|logger| logger.with_formatter(TextFormatter::with_colors(enabled)));
}

pub fn tag<I, T>(tags: I) -> Handle
where
    I: IntoIterator<Item = T>,
    T: Into<Cow<'static, str>>,
{
    default_logger().tag(tags)
}

pub fn di() -> Handle {
    default_logger().di()
}

pub fn no_di() -> Handle {
    default_logger().no_di()
}

pub fn proto_level() -> Handle {
    default_logger().proto_level()
}

pub fn debug_level() -> Handle {
    default_logger().debug_level()
}

pub fn info_level() -> Handle {
    default_logger().info_level()
}

pub fn error_level() -> Handle {
    default_logger().error_level()
}

#[track_caller]
pub fn print(message: impl fmt::Display) {
    default_logger().print(message);
}

#[track_caller]
pub fn printf(args: fmt::Arguments<'_>) {
    default_logger().printf(args);
}

#[track_caller]
pub fn println(message: impl fmt::Display) {
    default_logger().println(message);
}

#[track_caller]
pub fn error(message: impl fmt::Display) {
    default_logger().error(message);
}

#[track_caller]
pub fn errorf(args: fmt::Arguments<'_>) {
    default_logger().errorf(args);
}

#[track_caller]
pub fn errorln(message: impl fmt::Display) {
    default_logger().errorln(message);
}

#[track_caller]
pub fn fatal(message: impl fmt::Display) {
    default_logger().fatal(message);
}

#[track_caller]
pub fn fatalf(args: fmt::Arguments<'_>) {
    default_logger().fatalf(args);
}

#[track_caller]
pub fn fatalln(message: impl fmt::Display) {
    default_logger().fatalln(message);
}

#[track_caller]
pub fn panic(message: impl fmt::Display) -> ! {
    default_logger().panic(message)
}

#[track_caller]
pub fn panicf(args: fmt::Arguments<'_>) -> ! {
    default_logger().panicf(args)
}

#[track_caller]
pub fn panicln(message: impl fmt::Display) -> ! {
    default_logger().panicln(message)
}

#[track_caller]
pub fn fail(message: impl fmt::Display) -> Failure {
    default_logger().fail(message)
}

#[track_caller]
pub fn log_panic(payload: &(dyn Any + Send), stack: &dyn fmt::Display, cont: bool) {
    default_logger().log_panic(payload, stack, cont);
}

/// Runs `f` and logs a panic from it through the default logger.
///
/// When `cont` is false a caught panic also closes the sink and calls the
/// exit function.
#[track_caller]
pub fn recover<F, R>(cont: bool, f: F) -> Option<R>
where
    F: FnOnce() -> R + UnwindSafe,
{
    default_logger().recover(cont, f)
}
