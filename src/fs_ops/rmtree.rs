//! Recursive removal.
//!
//! Walks bottom-up with `walkdir` (`contents_first`), never following links.
//! Each failure is reported to `onexc` with the operation that failed; without
//! a handler the first failure aborts the walk.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{FsError, FsResult};

/// Which step of the removal failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RmOp {
    Lstat,
    ScanDir,
    Unlink,
    Rmdir,
}

impl fmt::Display for RmOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RmOp::Lstat => "lstat",
            RmOp::ScanDir => "scandir",
            RmOp::Unlink => "unlink",
            RmOp::Rmdir => "rmdir",
        };
        f.write_str(s)
    }
}

/// Error callback: failed step, the path it failed on, and the error.
pub type OnExc = Arc<dyn Fn(RmOp, &Path, &FsError) + Send + Sync>;

#[derive(Clone, Default)]
pub struct RmTreeOptions {
    pub ignore_errors: bool,
    pub onexc: Option<OnExc>,
}

impl fmt::Debug for RmTreeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RmTreeOptions")
            .field("ignore_errors", &self.ignore_errors)
            .field("onexc", &self.onexc.is_some())
            .finish()
    }
}

impl RmTreeOptions {
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = ignore;
        self
    }

    pub fn onexc(mut self, onexc: OnExc) -> Self {
        self.onexc = Some(onexc);
        self
    }
}

enum Flow {
    Continue,
    Abort(FsError),
}

fn report(options: &RmTreeOptions, op: RmOp, path: &Path, err: FsError) -> Flow {
    if options.ignore_errors {
        debug!(%op, path = %path.display(), error = %err, "rmtree: ignoring error");
        return Flow::Continue;
    }
    match &options.onexc {
        Some(handler) => {
            handler(op, path, &err);
            Flow::Continue
        }
        None => Flow::Abort(err),
    }
}

/// Remove the directory tree at `path`.
///
/// A symlink root is refused with `FsError::SymlinkRoot` (routed through the
/// handler when one is set).
pub fn rmtree(path: impl AsRef<Path>, options: &RmTreeOptions) -> FsResult<()> {
    let path = path.as_ref();

    let root_meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) => {
            return match report(options, RmOp::Lstat, path, e.into()) {
                Flow::Continue => Ok(()),
                Flow::Abort(err) => Err(err),
            };
        }
    };
    if root_meta.file_type().is_symlink() {
        return match report(options, RmOp::Lstat, path, FsError::SymlinkRoot(path.to_path_buf())) {
            Flow::Continue => Ok(()),
            Flow::Abort(err) => Err(err),
        };
    }
    // a plain file is refused, never unlinked
    if !root_meta.is_dir() {
        let err = std::io::Error::new(
            std::io::ErrorKind::NotADirectory,
            format!("Not a directory: '{}'", path.display()),
        );
        return match report(options, RmOp::ScanDir, path, err.into()) {
            Flow::Continue => Ok(()),
            Flow::Abort(err) => Err(err),
        };
    }

    let walker = WalkDir::new(path).follow_links(false).contents_first(true);
    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                let failed = e.path().unwrap_or(path).to_path_buf();
                let io_err = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop while removing tree"));
                match report(options, RmOp::ScanDir, &failed, io_err.into()) {
                    Flow::Continue => continue,
                    Flow::Abort(err) => return Err(err),
                }
            }
        };

        let (op, result) = if entry.file_type().is_dir() {
            (RmOp::Rmdir, fs::remove_dir(entry.path()))
        } else {
            (RmOp::Unlink, remove_file(entry.path()))
        };
        if let Err(e) = result {
            match report(options, op, entry.path(), e.into()) {
                Flow::Continue => {}
                Flow::Abort(err) => {
                    warn!(%op, path = %entry.path().display(), "rmtree aborted");
                    return Err(err);
                }
            }
        }
    }

    debug!(path = %path.display(), "removed tree");
    Ok(())
}

/// Remove a file, clearing the readonly attribute on Windows if that is what
/// blocked it.
fn remove_file(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        #[cfg(windows)]
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            let mut perms = fs::symlink_metadata(path)?.permissions();
            if !perms.readonly() {
                return Err(e);
            }
            perms.set_readonly(false);
            fs::set_permissions(path, perms)?;
            fs::remove_file(path)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::sync::Mutex;

    #[test]
    fn removes_nested_tree() {
        let temp = assert_fs::TempDir::new().unwrap();
        let root = temp.child("root");
        root.child("a/b/c.txt").write_str("c").unwrap();
        root.child("d.txt").write_str("d").unwrap();

        rmtree(root.path(), &RmTreeOptions::default()).unwrap();
        assert!(!root.path().exists());
    }

    #[test]
    fn missing_root_reports_lstat() {
        let temp = assert_fs::TempDir::new().unwrap();
        let missing = temp.path().join("gone");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: OnExc = Arc::new(move |op, p, e| {
            sink.lock().unwrap().push((op, p.to_path_buf(), e.io_kind()));
        });

        rmtree(&missing, &RmTreeOptions::default().onexc(handler)).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, RmOp::Lstat);
        assert_eq!(seen[0].1, missing);
        assert_eq!(seen[0].2, Some(std::io::ErrorKind::NotFound));
    }

    #[test]
    fn ignore_errors_swallows_missing_root() {
        let temp = assert_fs::TempDir::new().unwrap();
        rmtree(temp.path().join("gone"), &RmTreeOptions::default().ignore_errors(true)).unwrap();
    }

    #[test]
    fn plain_file_root_is_refused_and_kept() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("plain.txt");
        file.write_str("keep").unwrap();

        let err = rmtree(file.path(), &RmTreeOptions::default()).unwrap_err();
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotADirectory));
        file.assert("keep");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: OnExc = Arc::new(move |op, _p, _e| sink.lock().unwrap().push(op));
        rmtree(file.path(), &RmTreeOptions::default().onexc(handler)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![RmOp::ScanDir]);

        rmtree(file.path(), &RmTreeOptions::default().ignore_errors(true)).unwrap();
        file.assert("keep");
    }

    #[cfg(unix)]
    #[test]
    fn refuses_symlink_root() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("target");
        target.child("keep.txt").write_str("k").unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(target.path(), &link).unwrap();

        let err = rmtree(&link, &RmTreeOptions::default()).unwrap_err();
        assert!(matches!(err, FsError::SymlinkRoot(_)));
        target.child("keep.txt").assert("k");
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_inside_are_unlinked_not_followed() {
        let temp = assert_fs::TempDir::new().unwrap();
        let outside = temp.child("outside");
        outside.child("keep.txt").write_str("k").unwrap();
        let root = temp.child("root");
        root.create_dir_all().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();

        rmtree(root.path(), &RmTreeOptions::default()).unwrap();
        assert!(!root.path().exists());
        outside.child("keep.txt").assert("k");
    }
}
