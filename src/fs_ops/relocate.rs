//! Move with rename-then-copy fallback.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{FsError, FsResult};

use super::rmtree::{rmtree, RmTreeOptions};
use super::tree::{copytree, CopyFn, CopyTreeOptions};
use super::util::{basename, is_cross_device, is_symlink, make_symlink, same_file};

/// Move `src` to `dst` and return the final location.
///
/// An existing directory `dst` receives `dst/<name of src>`; if that already
/// exists the move fails with `FsError::DestinationExists`. A plain rename is
/// tried first. When it fails the source is copied (`copy_function` for files,
/// default [`copy2`](super::copy2); `copytree` keeping links for directories)
/// and then removed.
pub fn move_path(src: impl AsRef<Path>, dst: impl AsRef<Path>, copy_function: Option<CopyFn>) -> FsResult<PathBuf> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let mut real_dst = dst.to_path_buf();

    if dst.is_dir() {
        if same_file(src, dst) {
            // case-only rename of a directory onto itself
            fs::rename(src, dst)?;
            return Ok(dst.to_path_buf());
        }
        let name = basename(src).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{} has no file name", src.display()))
        })?;
        real_dst = dst.join(name);
        if fs::symlink_metadata(&real_dst).is_ok() {
            return Err(FsError::DestinationExists(real_dst));
        }
    }

    match fs::rename(src, &real_dst) {
        Ok(()) => {
            debug!(src = %src.display(), dst = %real_dst.display(), "renamed");
            return Ok(real_dst);
        }
        Err(e) => {
            debug!(src = %src.display(), dst = %real_dst.display(), error = %e, cross_device = is_cross_device(&e), "rename failed; copying instead");
        }
    }

    let options = match copy_function {
        Some(f) => CopyTreeOptions::default().copy_function(f),
        None => CopyTreeOptions::default(),
    };

    if is_symlink(src) {
        let target = fs::read_link(src)?;
        make_symlink(&target, &real_dst)?;
        fs::remove_file(src)?;
    } else if src.is_dir() {
        if is_inside(src, dst)? {
            return Err(FsError::MoveIntoSelf {
                src: src.to_path_buf(),
                dst: dst.to_path_buf(),
            });
        }
        copytree(src, &real_dst, &options.symlinks(true))?;
        rmtree(src, &RmTreeOptions::default())?;
    } else {
        (options.copy_function)(src, &real_dst)?;
        fs::remove_file(src)?;
    }

    info!(src = %src.display(), dst = %real_dst.display(), "moved by copy and delete");
    Ok(real_dst)
}

/// True when `dst` is `src` or lies below it.
fn is_inside(src: &Path, dst: &Path) -> std::io::Result<bool> {
    let src = std::path::absolute(src)?;
    let dst = std::path::absolute(dst)?;
    Ok(dst.starts_with(&src))
}
