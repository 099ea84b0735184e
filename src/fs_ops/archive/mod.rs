//! Archive creation and extraction with a process-wide format registry.
//!
//! Built-in formats: `tar`, `gztar` and `zip`. Callers may register their own
//! writers and unpackers; lookups copy the handler out of the registry before
//! running it so the lock is never held across I/O.

mod make;
mod unpack;

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::errors::{FsError, FsResult};

/// Everything a writer needs to produce one archive.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveJob<'a> {
    /// Archive path without the format extension.
    pub base_name: &'a Path,
    /// Directory the archive's member names are relative to.
    pub root_dir: &'a Path,
    /// Subtree of `root_dir` to include.
    pub base_dir: &'a Path,
    pub dry_run: bool,
}

/// Writes the archive described by the job and returns its path.
pub type ArchiveWriter = Arc<dyn Fn(&ArchiveJob<'_>) -> FsResult<PathBuf> + Send + Sync>;

/// Extracts `filename` into `extract_dir`.
pub type UnpackFn = Arc<dyn Fn(&Path, &Path) -> FsResult<()> + Send + Sync>;

#[derive(Debug, Clone, Default)]
pub struct MakeArchiveOptions {
    /// Defaults to the current directory.
    pub root_dir: Option<PathBuf>,
    /// Defaults to `.`, i.e. all of `root_dir`.
    pub base_dir: Option<PathBuf>,
    /// Compute and log the archive name without writing anything.
    pub dry_run: bool,
}

struct ArchiveFormat {
    writer: ArchiveWriter,
    description: String,
}

struct UnpackFormat {
    extensions: Vec<String>,
    unpacker: UnpackFn,
    description: String,
}

struct Registry {
    archive: BTreeMap<String, ArchiveFormat>,
    unpack: BTreeMap<String, UnpackFormat>,
}

impl Registry {
    fn builtin() -> Self {
        let mut archive = BTreeMap::new();
        let mut unpack = BTreeMap::new();
        let builtins: [(&str, ArchiveWriter, UnpackFn, &[&str], &str); 3] = [
            (
                "tar",
                Arc::new(make::write_tar) as ArchiveWriter,
                Arc::new(unpack::unpack_tar) as UnpackFn,
                &[".tar"],
                "uncompressed tar file",
            ),
            (
                "gztar",
                Arc::new(make::write_gztar) as ArchiveWriter,
                Arc::new(unpack::unpack_gztar) as UnpackFn,
                &[".tar.gz", ".tgz"],
                "gzip'ed tar-file",
            ),
            (
                "zip",
                Arc::new(make::write_zip) as ArchiveWriter,
                Arc::new(unpack::unpack_zip) as UnpackFn,
                &[".zip"],
                "ZIP file",
            ),
        ];
        for (name, writer, unpacker, exts, description) in builtins {
            archive.insert(
                name.to_string(),
                ArchiveFormat {
                    writer,
                    description: description.to_string(),
                },
            );
            unpack.insert(
                name.to_string(),
                UnpackFormat {
                    extensions: exts.iter().map(|e| e.to_string()).collect(),
                    unpacker,
                    description: description.to_string(),
                },
            );
        }
        Registry { archive, unpack }
    }
}

fn registry() -> &'static RwLock<Registry> {
    static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(Registry::builtin()))
}

// A panicking custom handler never runs under the lock, so poisoned state is still consistent.
fn read_registry() -> RwLockReadGuard<'static, Registry> {
    registry().read().unwrap_or_else(PoisonError::into_inner)
}

fn write_registry() -> RwLockWriteGuard<'static, Registry> {
    registry().write().unwrap_or_else(PoisonError::into_inner)
}

/// `(name, description)` of every archive writer, sorted by name.
pub fn get_archive_formats() -> Vec<(String, String)> {
    read_registry()
        .archive
        .iter()
        .map(|(name, f)| (name.clone(), f.description.clone()))
        .collect()
}

/// Add or replace an archive writer.
pub fn register_archive_format(name: &str, writer: ArchiveWriter, description: &str) {
    write_registry().archive.insert(
        name.to_string(),
        ArchiveFormat {
            writer,
            description: description.to_string(),
        },
    );
    debug!(format = name, "registered archive format");
}

pub fn unregister_archive_format(name: &str) -> FsResult<()> {
    write_registry()
        .archive
        .remove(name)
        .map(|_| ())
        .ok_or_else(|| FsError::UnknownFormat(name.to_string()))
}

/// `(name, extensions, description)` of every unpacker, sorted by name.
pub fn get_unpack_formats() -> Vec<(String, Vec<String>, String)> {
    read_registry()
        .unpack
        .iter()
        .map(|(name, f)| (name.clone(), f.extensions.clone(), f.description.clone()))
        .collect()
}

/// Add or replace an unpacker. Fails if one of `extensions` already belongs
/// to another format.
pub fn register_unpack_format(name: &str, extensions: &[&str], unpacker: UnpackFn, description: &str) -> FsResult<()> {
    let mut reg = write_registry();
    for (other, f) in &reg.unpack {
        if other == name {
            continue;
        }
        if let Some(ext) = extensions.iter().find(|e| f.extensions.iter().any(|x| x == *e)) {
            return Err(FsError::Registry(format!("{ext} is already registered for \"{other}\"")));
        }
    }
    reg.unpack.insert(
        name.to_string(),
        UnpackFormat {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            unpacker,
            description: description.to_string(),
        },
    );
    debug!(format = name, ?extensions, "registered unpack format");
    Ok(())
}

pub fn unregister_unpack_format(name: &str) -> FsResult<()> {
    write_registry()
        .unpack
        .remove(name)
        .map(|_| ())
        .ok_or_else(|| FsError::UnknownFormat(name.to_string()))
}

/// Create an archive of `base_dir` (relative to `root_dir`) named
/// `base_name` plus the format's extension. Returns the archive path.
pub fn make_archive(base_name: impl AsRef<Path>, format: &str, options: &MakeArchiveOptions) -> FsResult<PathBuf> {
    let writer = read_registry()
        .archive
        .get(format)
        .map(|f| Arc::clone(&f.writer))
        .ok_or_else(|| FsError::UnknownFormat(format.to_string()))?;

    let root_dir = match &options.root_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir()?,
    };
    let base_dir = options.base_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let job = ArchiveJob {
        base_name: base_name.as_ref(),
        root_dir: &root_dir,
        base_dir: &base_dir,
        dry_run: options.dry_run,
    };

    let archive = writer(&job)?;
    info!(format, archive = %archive.display(), root_dir = %root_dir.display(), dry_run = options.dry_run, "created archive");
    Ok(archive)
}

/// Extract `filename` into `extract_dir` (default: current directory).
///
/// The format comes from `format` or, when absent, from the file extension.
pub fn unpack_archive(filename: impl AsRef<Path>, extract_dir: Option<&Path>, format: Option<&str>) -> FsResult<()> {
    let filename = filename.as_ref();
    let unpacker = {
        let reg = read_registry();
        match format {
            Some(name) => reg.unpack.get(name).map(|f| Arc::clone(&f.unpacker)),
            None => {
                let name = filename.to_string_lossy();
                reg.unpack
                    .values()
                    .find(|f| f.extensions.iter().any(|ext| name.ends_with(ext.as_str())))
                    .map(|f| Arc::clone(&f.unpacker))
            }
        }
    };
    let unpacker = unpacker.ok_or_else(|| {
        FsError::UnknownFormat(match format {
            Some(name) => name.to_string(),
            None => filename.display().to_string(),
        })
    })?;

    let extract_dir = match extract_dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir()?,
    };
    unpacker(filename, &extract_dir)?;
    info!(archive = %filename.display(), extract_dir = %extract_dir.display(), "unpacked archive");
    Ok(())
}
