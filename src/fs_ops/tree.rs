//! Recursive directory copy.
//!
//! Per-entry failures do not stop the walk; they are collected and returned
//! together as `FsError::Tree` once the whole tree has been attempted.

use globset::{GlobBuilder, GlobSetBuilder};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::{FsError, FsResult, TreeFailure};

use super::copy::copy2;
use super::metadata::copystat;
use super::util::make_symlink;

/// Given a directory and the names of its entries, return the names to skip.
pub type IgnoreFn = Arc<dyn Fn(&Path, &[String]) -> HashSet<String> + Send + Sync>;

/// File copier used for every non-directory entry.
pub type CopyFn = Arc<dyn Fn(&Path, &Path) -> FsResult<PathBuf> + Send + Sync>;

#[derive(Clone)]
pub struct CopyTreeOptions {
    /// Recreate symlinks instead of copying what they point to.
    pub symlinks: bool,
    pub ignore: Option<IgnoreFn>,
    pub copy_function: CopyFn,
    /// Skip links whose target is missing (only when `symlinks` is false).
    pub ignore_dangling_symlinks: bool,
    /// Merge into an existing destination instead of failing.
    pub dirs_exist_ok: bool,
}

impl Default for CopyTreeOptions {
    fn default() -> Self {
        Self {
            symlinks: false,
            ignore: None,
            copy_function: Arc::new(|src: &Path, dst: &Path| copy2(src, dst, true)),
            ignore_dangling_symlinks: false,
            dirs_exist_ok: false,
        }
    }
}

impl fmt::Debug for CopyTreeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyTreeOptions")
            .field("symlinks", &self.symlinks)
            .field("ignore", &self.ignore.is_some())
            .field("ignore_dangling_symlinks", &self.ignore_dangling_symlinks)
            .field("dirs_exist_ok", &self.dirs_exist_ok)
            .finish_non_exhaustive()
    }
}

impl CopyTreeOptions {
    pub fn symlinks(mut self, symlinks: bool) -> Self {
        self.symlinks = symlinks;
        self
    }

    pub fn ignore(mut self, ignore: IgnoreFn) -> Self {
        self.ignore = Some(ignore);
        self
    }

    pub fn copy_function(mut self, copy_function: CopyFn) -> Self {
        self.copy_function = copy_function;
        self
    }

    pub fn ignore_dangling_symlinks(mut self, skip: bool) -> Self {
        self.ignore_dangling_symlinks = skip;
        self
    }

    pub fn dirs_exist_ok(mut self, ok: bool) -> Self {
        self.dirs_exist_ok = ok;
        self
    }
}

/// Copy the tree rooted at `src` to `dst`. Returns `dst`.
pub fn copytree(src: impl AsRef<Path>, dst: impl AsRef<Path>, options: &CopyTreeOptions) -> FsResult<PathBuf> {
    let (src, dst) = (src.as_ref(), dst.as_ref());

    let entries: Vec<fs::DirEntry> = fs::read_dir(src)?.collect::<io::Result<_>>()?;
    let names: Vec<String> = entries
        .iter()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    let ignored = match &options.ignore {
        Some(ignore) => ignore(src, &names),
        None => HashSet::new(),
    };

    if options.dirs_exist_ok {
        fs::create_dir_all(dst)?;
    } else {
        create_dir_new(dst)?;
    }

    let mut failures = Vec::new();
    for (entry, name) in entries.iter().zip(&names) {
        if ignored.contains(name) {
            continue;
        }
        let src_name = entry.path();
        let dst_name = dst.join(entry.file_name());
        if let Err(e) = copy_entry(entry, &src_name, &dst_name, options) {
            match e {
                FsError::Tree(mut nested) => failures.append(&mut nested),
                other => failures.push(TreeFailure {
                    src: src_name,
                    dst: dst_name,
                    reason: other.to_string(),
                }),
            }
        }
    }

    if let Err(e) = copystat(src, dst, true) {
        // Windows may refuse to touch directory times; that is not a copy failure there
        let win_refusal = cfg!(windows) && matches!(&e, FsError::Io(io) if io.raw_os_error().is_some());
        if !win_refusal {
            failures.push(TreeFailure {
                src: src.to_path_buf(),
                dst: dst.to_path_buf(),
                reason: e.to_string(),
            });
        }
    }

    if failures.is_empty() {
        debug!(src = %src.display(), dst = %dst.display(), "copied tree");
        Ok(dst.to_path_buf())
    } else {
        warn!(src = %src.display(), dst = %dst.display(), failures = failures.len(), "tree copy finished with errors");
        Err(FsError::Tree(failures))
    }
}

fn create_dir_new(dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::create_dir(dst)
}

fn copy_entry(entry: &fs::DirEntry, src: &Path, dst: &Path, options: &CopyTreeOptions) -> FsResult<()> {
    let file_type = entry.file_type()?;

    if file_type.is_symlink() {
        if options.symlinks {
            let target = fs::read_link(src)?;
            make_symlink(&target, dst)?;
            copystat(src, dst, false)?;
            return Ok(());
        }
        // follow the link; a missing target surfaces here
        let meta = match fs::metadata(src) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound && options.ignore_dangling_symlinks => {
                debug!(link = %src.display(), "skipping dangling symlink");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        if meta.is_dir() {
            copytree(src, dst, options)?;
        } else {
            (options.copy_function)(src, dst)?;
        }
        return Ok(());
    }

    if file_type.is_dir() {
        copytree(src, dst, options)?;
    } else {
        (options.copy_function)(src, dst)?;
    }
    Ok(())
}

/// Build an [`IgnoreFn`] skipping entry names that match any glob pattern
/// (`*`, `?`, `[...]`). Matching is case-insensitive on Windows.
pub fn ignore_patterns<S: AsRef<str>>(patterns: &[S]) -> FsResult<IgnoreFn> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern.as_ref())
            .case_insensitive(cfg!(windows))
            .literal_separator(true)
            .build()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    Ok(Arc::new(move |_dir: &Path, names: &[String]| {
        names
            .iter()
            .filter(|n| set.is_match(n.as_str()))
            .cloned()
            .collect()
    }))
}
