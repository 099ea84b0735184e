//! Metadata copying.
//! - `copymode`: permission bits (readonly attribute on Windows).
//! - `copystat`: permission bits, access/modify times and, with the `xattrs`
//!   feature, extended attributes.
//!
//! Permission and time failures are returned; xattr failures are logged and
//! skipped since many filesystems do not support them.

use filetime::{set_file_times, set_symlink_file_times, FileTime};
use std::fs;
use std::path::Path;
use tracing::trace;

use crate::errors::FsResult;

use super::util::is_symlink;

fn stat(path: &Path, follow_symlinks: bool) -> std::io::Result<fs::Metadata> {
    if follow_symlinks {
        fs::metadata(path)
    } else {
        fs::symlink_metadata(path)
    }
}

/// Copy permission bits from `src` to `dst`.
///
/// With `follow_symlinks = false` and both paths being links, this is a no-op
/// where the OS cannot change a link's own mode.
pub fn copymode(src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    if !follow_symlinks && is_symlink(src) && is_symlink(dst) {
        trace!(src = %src.display(), dst = %dst.display(), "copymode: symlink modes are not settable");
        return Ok(());
    }
    let meta = stat(src, follow_symlinks)?;
    set_mode(dst, &meta)?;
    Ok(())
}

/// Copy permission bits, timestamps and extended attributes.
pub fn copystat(src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let on_links = !follow_symlinks && is_symlink(src) && is_symlink(dst);
    let meta = stat(src, follow_symlinks)?;

    // 1) Timestamps
    let (atime, mtime) = file_times(&meta);
    if on_links {
        set_symlink_file_times(dst, atime, mtime)?;
    } else {
        set_file_times(dst, atime, mtime)?;
    }
    trace!(path = %dst.display(), "set atime/mtime on destination");

    // 2) Extended attributes before permissions, in case the mode drops write access
    if !on_links {
        preserve_xattrs(src, dst);
    }

    // 3) Permissions
    if !on_links {
        set_mode(dst, &meta)?;
    }
    Ok(())
}

fn file_times(meta: &fs::Metadata) -> (FileTime, FileTime) {
    let mtime = FileTime::from_last_modification_time(meta);
    let atime = FileTime::from_last_access_time(meta);
    (atime, mtime)
}

fn set_mode(dst: &Path, src_meta: &fs::Metadata) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let src_mode = src_meta.permissions().mode() & 0o7777;
        fs::set_permissions(dst, fs::Permissions::from_mode(src_mode))?;
        trace!(path = %dst.display(), mode = format!("{:o}", src_mode), "set permissions on destination");
    }
    // Windows: the readonly attribute is the only mode bit there is
    #[cfg(windows)]
    {
        let ro = src_meta.permissions().readonly();
        let mut perms = fs::metadata(dst)?.permissions();
        perms.set_readonly(ro);
        fs::set_permissions(dst, perms)?;
        trace!(path = %dst.display(), readonly = ro, "set readonly attribute on destination");
    }
    Ok(())
}

/// Best-effort copy of extended attributes (feature `xattrs`; no-op otherwise).
fn preserve_xattrs(src: &Path, dst: &Path) {
    #[cfg(feature = "xattrs")]
    {
        use tracing::warn;
        match xattr::list(src) {
            Ok(names) => {
                for name in names {
                    let name_disp = name.to_string_lossy().into_owned();
                    match xattr::get(src, &name) {
                        Ok(value) => {
                            let value = value.unwrap_or_default();
                            if let Err(e) = xattr::set(dst, &name, &value) {
                                warn!(src = %src.display(), dst = %dst.display(), xattr = %name_disp, error = %e, "failed to set xattr on destination");
                            } else {
                                trace!(dst = %dst.display(), xattr = %name_disp, size = value.len(), "preserved xattr");
                            }
                        }
                        Err(e) => {
                            warn!(src = %src.display(), xattr = %name_disp, error = %e, "failed to read xattr value from source");
                        }
                    }
                }
            }
            Err(e) => {
                warn!(src = %src.display(), error = %e, "failed to list xattrs; continuing");
            }
        }
    }
    #[cfg(not(feature = "xattrs"))]
    {
        let _ = (src, dst);
    }
}
