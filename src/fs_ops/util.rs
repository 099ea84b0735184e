use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// True when both paths exist and refer to the same file.
pub(super) fn same_file(a: &Path, b: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        match (fs::metadata(a), fs::metadata(b)) {
            (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
            _ => false,
        }
    }
    #[cfg(not(unix))]
    {
        match (fs::canonicalize(a), fs::canonicalize(b)) {
            (Ok(ca), Ok(cb)) => ca == cb,
            _ => false,
        }
    }
}

/// True for named pipes (Unix only).
pub(super) fn is_fifo(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        fs::metadata(path)
            .map(|m| m.file_type().is_fifo())
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        false
    }
}

pub(super) fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Recreate a symlink pointing at `target` at `link`.
pub(super) fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }
    #[cfg(windows)]
    {
        let resolved = match link.parent() {
            Some(parent) if target.is_relative() => parent.join(target),
            _ => target.to_path_buf(),
        };
        if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

/// Last component of `path`, ignoring trailing separators.
pub(super) fn basename(path: &Path) -> Option<OsString> {
    path.file_name().map(|n| n.to_owned())
}

/// `dst/<name of src>` when `dst` is an existing directory, else `dst`.
pub(super) fn into_dir_target(src: &Path, dst: &Path) -> PathBuf {
    if dst.is_dir() {
        if let Some(name) = basename(src) {
            return dst.join(name);
        }
    }
    dst.to_path_buf()
}

pub(super) fn is_cross_device(e: &io::Error) -> bool {
    // std::io::ErrorKind has no stable CrossesDevices variant everywhere,
    // so detect EXDEV / ERROR_NOT_SAME_DEVICE via raw OS error codes.
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            if code == libc::EXDEV {
                return true;
            }
        }
        #[cfg(windows)]
        {
            // ERROR_NOT_SAME_DEVICE
            if code == 17 {
                return true;
            }
        }
    }
    false
}
