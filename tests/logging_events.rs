//! Path rewrites and forwarded calls show up as tracing events.

use long_path_fs::{Capability, LongPathNormalizer, PathNormalizer, WorkingDir};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::Level;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn prefixing_emits_debug_event() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let n = LongPathNormalizer::new()
        .with_capability(Capability::LegacyPathLimit)
        .with_working_dir(WorkingDir::Fixed(r"C:\logs".into()));
    tracing::subscriber::with_default(subscriber, || {
        n.normalize(Path::new(r"C:\data\file.txt"));
    });

    let text = capture.text();
    assert!(text.contains("added long-path prefix"), "{text}");
    assert!(text.contains(r"\\?\C:\data\file.txt"), "{text}");
}

#[test]
fn identity_rewrite_is_silent() {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let n = LongPathNormalizer::new().with_capability(Capability::Unrestricted);
    tracing::subscriber::with_default(subscriber, || {
        n.normalize(Path::new("plain/path"));
    });
    assert!(!capture.text().contains("long-path prefix"));
}
