//! Global subscriber installation. One test per binary: the subscriber is process-wide.

use long_path_fs::{init_tracing, LogLevel};
use std::fs;

#[test]
fn file_layer_receives_events_and_second_init_fails() {
    let td = tempfile::tempdir().unwrap();
    // Resolve symlinked temp roots; symlinked log ancestors are refused.
    let root = td.path().canonicalize().unwrap();
    let log = root.join("logs/app.log");

    let guard = init_tracing(&LogLevel::Normal, Some(&log), false).unwrap();
    assert!(guard.is_some());
    tracing::info!("first line in the log file");
    tracing::debug!("below the configured level");
    drop(guard);

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("first line in the log file"));
    assert!(!text.contains("below the configured level"));

    assert!(init_tracing(&LogLevel::Debug, None, true).is_err());
}
