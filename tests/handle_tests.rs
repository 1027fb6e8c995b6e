use chainlog::{
    log_error, log_print, Config, Failure, JsonEntry, JsonFormatter, Logger, Severity, SharedBuffer,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const THIS_FILE: &str = "tests/handle_tests.rs";

fn capture(level: Severity) -> (Logger, SharedBuffer) {
    let out = SharedBuffer::new();
    let logger = Config::new("test")
        .level(level)
        .pool_size(4)
        .sink(out.clone())
        .build();
    (logger, out)
}

#[test]
fn test_records_below_level_are_dropped() {
    let (logger, out) = capture(Severity::Error);

    logger.print("info is below error");
    logger.debug_level().print("so is debug");
    assert!(out.is_empty(), "Nothing should reach the sink");

    logger.error("kept");
    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" - error - kept"));

    // The minimum level can be lowered for one chain
    logger.set_level(Severity::Protocol).proto_level().print("wire");
    assert!(out.lines()[1].ends_with(" - protocol - wire"));
}

#[test]
fn test_no_priority_level_only_passes_no_priority() {
    let (logger, out) = capture(Severity::NoPriority);
    logger.handle().severity(Severity::Panic).print("dropped");
    assert!(out.is_empty());
    logger.severity(Severity::NoPriority).print("kept");
    assert!(out.contents_string().contains(" - no priority - kept"));
}

#[test]
fn test_chains_from_frozen_logger_are_private() {
    let (logger, out) = capture(Severity::Debug);

    let first = logger.tag(["first"]);
    let second = logger.tag(["second"]).error_level();
    assert_eq!(first.record().tags().iter().collect::<Vec<_>>(), ["first"]);
    assert_eq!(second.record().tags().iter().collect::<Vec<_>>(), ["second"]);
    assert_eq!(first.record().severity(), Severity::Info);

    first.print("a");
    second.print("b");
    logger.print("c");

    let lines = out.lines();
    assert!(lines[0].ends_with(" - info - first - a"));
    assert!(lines[1].ends_with(" - error - second - b"));
    assert!(lines[2].ends_with(" - info - c"));
    assert!(logger.template().tags().is_empty());
}

#[test]
fn test_handle_chain_mutates_in_place() {
    let (logger, out) = capture(Severity::Debug);

    let handle = logger.handle().tag(["x"]).add_tags(["y"]).debug_level();
    assert_eq!(handle.record().tags().iter().collect::<Vec<_>>(), ["x", "y"]);
    assert_eq!(handle.record().severity(), Severity::Debug);

    // tag replaces, add_tags appends
    let handle = handle.tag(["z"]);
    assert_eq!(handle.record().tags().iter().collect::<Vec<_>>(), ["z"]);
    handle.print("done");

    assert!(out.contents_string().ends_with(" - debug - z - done\n"));
}

#[test]
fn test_no_tag_leakage_after_recycling() {
    let (logger, out) = capture(Severity::Debug);

    // More chains than pooled handles forces reuse of every record
    for i in 0..10 {
        logger.tag(["secret"]).error_level().di().print(i);
    }
    out.take();

    for _ in 0..10 {
        logger.print("plain");
    }
    for line in out.lines() {
        assert!(line.ends_with(" - info - plain"), "Leaked state in {line:?}");
        assert!(!line.contains(THIS_FILE));
    }
}

#[test]
fn test_handles_return_to_pool() {
    let (logger, _out) = capture(Severity::Error);
    let idle = logger.idle_handles();

    logger.print("filtered by level");
    assert_eq!(logger.idle_handles(), idle);

    let held = logger.tag(["held"]);
    assert_eq!(logger.idle_handles(), idle - 1);
    drop(held);
    assert_eq!(logger.idle_handles(), idle);

    logger.error("written");
    assert_eq!(logger.idle_handles(), idle);
}

#[test]
fn test_pool_grows_on_demand() {
    let (logger, out) = capture(Severity::Debug);
    let held: Vec<_> = (0..10).map(|i| logger.tag([format!("h{i}")])).collect();
    assert_eq!(logger.idle_handles(), 0);

    for handle in held {
        handle.print("x");
    }
    assert_eq!(out.lines().len(), 10);
    assert_eq!(logger.idle_handles(), 10);
}

#[test]
fn test_call_site_handle_and_logger() {
    let (logger, out) = capture(Severity::Debug);

    let line = line!() + 1;
    logger.handle().di().print("from handle");
    let expected = format!(" - {THIS_FILE}:{line} - from handle");
    assert!(out.lines()[0].ends_with(&expected), "{:?}", out.lines()[0]);

    let line = line!() + 1;
    logger.di().error("from logger");
    let expected = format!(" - error - {THIS_FILE}:{line} - from logger");
    assert!(out.lines()[1].ends_with(&expected), "{:?}", out.lines()[1]);
}

#[test]
fn test_call_site_from_call_site_logger() {
    let out = SharedBuffer::new();
    let logger = Config::new("test").call_site(true).sink(out.clone()).build();

    let line = line!() + 1;
    logger.printf(format_args!("n={}", 1));
    assert!(out.lines()[0].ends_with(&format!(" - {THIS_FILE}:{line} - n=1")));

    logger.no_di().print("without");
    assert!(out.lines()[1].ends_with(" - info - without"));
}

#[test]
fn test_call_site_through_macros() {
    let (logger, out) = capture(Severity::Debug);

    let line = line!() + 1;
    log_print!(logger.di(), "macro {}", 1);
    assert!(out.lines()[0].ends_with(&format!(" - {THIS_FILE}:{line} - macro 1")));

    let line = line!() + 1;
    log_error!(logger.di(), "macro {}", 2);
    assert!(out.lines()[1].ends_with(&format!(" - error - {THIS_FILE}:{line} - macro 2")));
}

#[test]
fn test_filter() {
    let (logger, out) = capture(Severity::Debug);
    let only_kept = logger
        .filter(|handle| handle.record().tags().contains("keep"))
        .freeze();

    only_kept.tag(["keep"]).print("yes");
    only_kept.tag(["drop"]).print("no");
    only_kept.print("no tags");

    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" - keep - yes"));

    // The original logger has no filter
    logger.print("unfiltered");
    assert_eq!(out.lines().len(), 2);
}

#[test]
fn test_make_default_derives_new_logger() {
    let (logger, out) = capture(Severity::Debug);
    let derived = logger.tag(["derived"]).error_level().make_default();
    assert!(!derived.ptr_eq(&logger));
    assert!(logger.clone().ptr_eq(&logger));

    derived.print("one");
    logger.print("two");
    let lines = out.lines();
    assert!(lines[0].ends_with(" - error - derived - one"));
    assert!(lines[1].ends_with(" - info - two"));
}

#[test]
fn test_println_is_terminated_once() {
    let (logger, out) = capture(Severity::Debug);
    logger.println("one");
    logger.print("two\n");
    logger.errorln("three");
    let text = out.contents_string();
    assert!(!text.contains("\n\n"));
    assert_eq!(out.lines().len(), 3);
}

#[test]
fn test_fatal_writes_closes_then_exits() {
    let out = SharedBuffer::new();
    let exits = Arc::new(AtomicUsize::new(0));

    let observed = out.clone();
    let counter = Arc::clone(&exits);
    let logger = Config::new("test")
        .sink(out.clone())
        .exiter(move |code| {
            assert_eq!(code, 1);
            // Record and close must already have happened
            assert!(observed.contents_string().contains(" - fatal - disk gone"));
            let calls = counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(observed.closes(), calls + 1);
        })
        .build();

    logger.tag(["io"]).fatal("disk gone");
    assert_eq!(exits.load(Ordering::SeqCst), 1);
    assert!(out.lines()[0].ends_with(" - fatal - io - disk gone"));

    logger.fatalf(format_args!("code {}", 7));
    assert_eq!(exits.load(Ordering::SeqCst), 2);
    assert_eq!(out.closes(), 2);
}

#[test]
fn test_fatal_exits_even_when_filtered() {
    let out = SharedBuffer::new();
    let exits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&exits);
    let logger = Config::new("test")
        .level(Severity::NoPriority)
        .sink(out.clone())
        .exiter(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    // Filtered out, but the process still exits
    logger.fatal("quiet");
    assert!(out.is_empty());
    assert_eq!(exits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_panic_payload_is_message() {
    let (logger, out) = capture(Severity::Debug);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        logger.tag(["core"]).panic("boom");
    }));
    let payload = result.unwrap_err();
    assert_eq!(payload.downcast_ref::<String>().unwrap(), "boom");

    assert!(out.lines()[0].ends_with(" - panic - core - boom"));
    assert_eq!(out.closes(), 1);
    assert_eq!(logger.idle_handles(), 4);
}

#[test]
fn test_panicf_payload() {
    let (logger, _out) = capture(Severity::Debug);
    let payload = panic::catch_unwind(AssertUnwindSafe(|| {
        logger.panicf(format_args!("bad value {}", 3));
    }))
    .unwrap_err();
    assert_eq!(payload.downcast_ref::<String>().unwrap(), "bad value 3");
}

#[test]
fn test_panicln_payload_drops_newline() {
    let (logger, out) = capture(Severity::Debug);
    let payload = panic::catch_unwind(AssertUnwindSafe(|| {
        logger.panicln("disk gone");
    }))
    .unwrap_err();
    assert_eq!(payload.downcast_ref::<String>().unwrap(), "disk gone");
    assert!(out.contents_string().ends_with(" - panic - disk gone\n"));
}

#[test]
fn test_fail_returns_error_value() {
    let (logger, out) = capture(Severity::Debug);

    fn open(logger: &Logger) -> Result<(), Failure> {
        Err(logger.tag(["cfg"]).fail(format_args!("missing {}", "key")))
    }

    let err = open(&logger).unwrap_err();
    assert_eq!(err.message(), "missing key");
    assert_eq!(err.to_string(), "missing key");
    assert!(out.lines()[0].ends_with(" - panic - cfg - missing key"));
    // No unwinding, the sink stays open
    assert_eq!(out.closes(), 0);
}

#[test]
fn test_recover_continues() {
    let (logger, out) = capture(Severity::Debug);

    let value = logger.recover(true, || 42);
    assert_eq!(value, Some(42));
    assert!(out.is_empty());

    let value: Option<i32> = logger.recover(true, || panic!("kaboom"));
    assert_eq!(value, None);

    let text = out.contents_string();
    assert!(text.contains(" - panic - kaboom\n\n{"));
    assert!(text.ends_with("}\n"));
}

#[inline(never)]
fn parse_section_header(input: &str) -> usize {
    match input.find(']') {
        Some(end) => end,
        None => panic!("unterminated section"),
    }
}

#[test]
fn test_recover_logs_stack_of_panicking_call() {
    let (logger, out) = capture(Severity::Debug);

    let value = logger.recover(true, || parse_section_header("[core"));
    assert_eq!(value, None);

    let text = out.contents_string();
    assert!(text.contains(" - panic - unterminated section\n\n{"));
    assert!(text.contains("parse_section_header"), "{text}");
}

#[test]
fn test_recover_without_continue_exits() {
    let out = SharedBuffer::new();
    let exits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&exits);
    let logger = Config::new("test")
        .sink(out.clone())
        .exiter(move |code| {
            assert_eq!(code, 1);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    let value: Option<()> = logger.recover(false, || panic!("fatal {}", "crash"));
    assert_eq!(value, None);
    assert_eq!(exits.load(Ordering::SeqCst), 1);
    assert_eq!(out.closes(), 1);
    assert!(out.contents_string().contains(" - panic - fatal crash\n\n{"));
}

#[test]
fn test_log_panic_with_custom_payload() {
    let (logger, out) = capture(Severity::Debug);
    let payload: Box<dyn std::any::Any + Send> = Box::new(17u32);
    logger.log_panic(&*payload, &"stack", true);
    assert!(out
        .contents_string()
        .ends_with(" - panic - Box<dyn Any>\n\n{stack}\n"));
}

#[test]
fn test_concurrent_emits_produce_whole_lines() {
    let (logger, out) = capture(Severity::Debug);

    thread::scope(|scope| {
        for worker in 0..8 {
            let logger = &logger;
            scope.spawn(move || {
                for i in 0..200 {
                    logger
                        .tag([format!("w{worker}")])
                        .printf(format_args!("worker {worker} message {i}"));
                }
            });
        }
    });

    let lines = out.lines();
    assert_eq!(lines.len(), 8 * 200);
    for line in &lines {
        assert!(line.starts_with("test - "), "Interleaved line {line:?}");
        let (tag, message) = line
            .rsplit_once(" - ")
            .and_then(|(head, msg)| Some((head.rsplit_once(" - ")?.1, msg)))
            .unwrap();
        let worker = message.split(' ').nth(1).unwrap();
        assert_eq!(tag, format!("w{worker}"));
    }
}

#[test]
fn test_with_formatter_shares_sink() {
    let (logger, out) = capture(Severity::Debug);
    let json = logger.tag(["api"]).freeze().with_formatter(JsonFormatter);

    logger.print("text");
    json.error("as json");
    logger.print("text again");

    let lines = out.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with(" - info - text"));
    let entry = JsonEntry::decode(lines[1].as_bytes()).unwrap();
    assert_eq!(entry.priority, "error");
    assert_eq!(entry.tags, ["api"]);
    assert_eq!(entry.message, "as json");
    assert!(lines[2].ends_with(" - info - text again"));

    assert_eq!(json.level(), Severity::Debug);
    assert_eq!(json.idle_handles(), 4);
    json.close().unwrap();
    assert_eq!(out.closes(), 1);
}
