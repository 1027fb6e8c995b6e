use chainlog::bridge::{self, LogBridge};
use chainlog::{Config, Severity, SharedBuffer};
use log::{LevelFilter, Log};

#[test]
fn test_bridge_maps_levels_and_targets() {
    let out = SharedBuffer::new();
    let logger = Config::new("bridged")
        .level(Severity::Debug)
        .sink(out.clone())
        .build();
    let bridge = LogBridge::new(logger);
    assert_eq!(bridge.max_level(), LevelFilter::Debug);

    bridge.log(
        &log::Record::builder()
            .level(log::Level::Warn)
            .target("db::pool")
            .args(format_args!("{} idle", 3))
            .build(),
    );
    bridge.log(
        &log::Record::builder()
            .level(log::Level::Trace)
            .target("wire")
            .args(format_args!("dropped"))
            .build(),
    );

    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" - error - db::pool - 3 idle"));
}

#[test]
fn test_bridge_uses_log_call_site() {
    let out = SharedBuffer::new();
    let logger = Config::new("bridged").call_site(true).sink(out.clone()).build();
    let bridge = LogBridge::new(logger);

    bridge.log(
        &log::Record::builder()
            .level(log::Level::Info)
            .target("app")
            .file_static(Some("src/deep/nested/module.rs"))
            .line(Some(42))
            .args(format_args!("from log"))
            .build(),
    );
    assert!(out.contents_string().ends_with(" - app - nested/module.rs:42 - from log\n"));
}

#[test]
fn test_init_installs_global_logger() {
    let out = SharedBuffer::new();
    let logger = Config::new("facade").sink(out.clone()).build();
    bridge::init(logger).unwrap();
    assert_eq!(log::max_level(), LevelFilter::Info);

    log::info!(target: "svc", "ready on {}", 8080);
    log::debug!("below the level");

    let lines = out.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("facade - "));
    assert!(lines[0].ends_with(" - info - svc - ready on 8080"));
}
