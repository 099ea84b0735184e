//! Single-file copies: `copyfile`, `copy`, `copy2`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{FsError, FsResult};

use super::io_copy::copy_contents;
use super::metadata::{copymode, copystat};
use super::util::{into_dir_target, is_fifo, is_symlink, make_symlink, same_file};

/// Copy the contents of `src` to `dst` (no metadata). Returns `dst`.
///
/// - `FsError::SameFile` when both name the same file.
/// - `FsError::SpecialFile` for named pipes.
/// - With `follow_symlinks = false`, a symlink `src` is recreated as a link.
pub fn copyfile(src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<PathBuf> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    if same_file(src, dst) {
        return Err(FsError::SameFile {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        });
    }
    for p in [src, dst] {
        if is_fifo(p) {
            return Err(FsError::SpecialFile(p.to_path_buf()));
        }
    }

    if !follow_symlinks && is_symlink(src) {
        let target = fs::read_link(src)?;
        make_symlink(&target, dst)?;
        debug!(src = %src.display(), dst = %dst.display(), "recreated symlink");
        return Ok(dst.to_path_buf());
    }

    if fs::metadata(src)?.is_dir() {
        return Err(io::Error::new(io::ErrorKind::IsADirectory, format!("{} is a directory", src.display())).into());
    }

    let bytes = copy_contents(src, dst)?;
    debug!(src = %src.display(), dst = %dst.display(), bytes, "copied file contents");
    Ok(dst.to_path_buf())
}

/// Contents plus permission bits. A directory `dst` receives `dst/<name of src>`.
/// Returns the path written.
pub fn copy(src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<PathBuf> {
    let src = src.as_ref();
    let dst = into_dir_target(src, dst.as_ref());
    copyfile(src, &dst, follow_symlinks)?;
    copymode(src, &dst, follow_symlinks)?;
    Ok(dst)
}

/// Contents plus all metadata `copystat` handles. Otherwise like [`copy`].
pub fn copy2(src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<PathBuf> {
    let src = src.as_ref();
    let dst = into_dir_target(src, dst.as_ref());
    copyfile(src, &dst, follow_symlinks)?;
    copystat(src, &dst, follow_symlinks)?;
    Ok(dst)
}
