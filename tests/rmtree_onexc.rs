//! The error callback sees the path the native layer was actually given.

use long_path_fs::{Capability, LongPathFs, LongPathNormalizer, OnExc, RmOp, RmTreeOptions, WorkingDir};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[test]
fn onexc_receives_prefixed_path() {
    // Forced capability: the rewritten name is not a real location on any host.
    let normalizer = LongPathNormalizer::new()
        .with_capability(Capability::LegacyPathLimit)
        .with_working_dir(WorkingDir::Fixed(r"C:\work".into()));
    let fs = LongPathFs::with_normalizer(normalizer);

    let seen: Arc<Mutex<Vec<(RmOp, PathBuf, Option<ErrorKind>)>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let handler: OnExc = Arc::new(move |op, path, err| {
        sink.lock().unwrap().push((op, path.to_path_buf(), err.io_kind()));
    });

    fs.rmtree(r"C:\lpfs-does-not-exist\x", &RmTreeOptions::default().onexc(handler))
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, RmOp::Lstat);
    assert_eq!(seen[0].1, PathBuf::from(r"\\?\C:\lpfs-does-not-exist\x"));
    assert_eq!(seen[0].2, Some(ErrorKind::NotFound));
}

#[test]
fn without_handler_first_error_propagates() {
    let td = tempfile::tempdir().unwrap();
    let fs = LongPathFs::new();
    let err = fs
        .rmtree(td.path().join("missing"), &RmTreeOptions::default())
        .unwrap_err();
    assert_eq!(err.io_kind(), Some(ErrorKind::NotFound));
}
