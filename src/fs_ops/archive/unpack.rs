//! Built-in unpackers. Every member must land inside the extract directory;
//! an archive naming anything else is refused with `FsError::Read`.

use filetime::{set_file_mtime, FileTime};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing::trace;
use zip::ZipArchive;

use crate::errors::{FsError, FsResult};

fn read_error(archive: &Path, e: impl std::fmt::Display) -> FsError {
    FsError::Read(format!("{} is not a valid archive: {e}", archive.display()))
}

/// A directory whose stored mode and time are applied once its contents exist.
struct DeferredDir {
    path: PathBuf,
    mode: Option<u32>,
    mtime: Option<FileTime>,
}

/// Apply directory metadata after extraction; a read-only mode set earlier
/// would block the members inside.
fn finish_dirs(dirs: Vec<DeferredDir>) -> io::Result<()> {
    for dir in dirs.into_iter().rev() {
        if let Some(mtime) = dir.mtime {
            set_file_mtime(&dir.path, mtime)?;
        }
        apply_unix_mode(&dir.path, dir.mode)?;
    }
    Ok(())
}

/// Where `unpack_in` put an entry that it accepted.
fn tar_target(extract_dir: &Path, member: &Path) -> PathBuf {
    let mut out = extract_dir.to_path_buf();
    for comp in member.components() {
        if let Component::Normal(part) = comp {
            out.push(part);
        }
    }
    out
}

fn unpack_tar_stream<R: Read>(archive: &Path, reader: R, extract_dir: &Path) -> FsResult<()> {
    fs::create_dir_all(extract_dir)?;
    let mut tar = tar::Archive::new(reader);
    tar.set_preserve_mtime(true);
    tar.set_preserve_permissions(cfg!(unix));
    let entries = tar.entries().map_err(|e| read_error(archive, e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let mut entry = entry.map_err(|e| read_error(archive, e))?;
        let member = entry.path().map(|p| p.into_owned()).ok();
        let name = member
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<invalid name>".to_string());
        let is_dir = entry.header().entry_type().is_dir();
        if is_dir {
            entry.set_preserve_permissions(false);
            entry.set_preserve_mtime(false);
        }
        let inside = entry.unpack_in(extract_dir)?;
        if !inside {
            return Err(FsError::Read(format!(
                "archive member {name} would be extracted outside {}",
                extract_dir.display()
            )));
        }
        if let (true, Some(member)) = (is_dir, member) {
            let header = entry.header();
            dirs.push(DeferredDir {
                path: tar_target(extract_dir, &member),
                mode: header.mode().ok().filter(|_| cfg!(unix)),
                mtime: header.mtime().ok().map(|t| FileTime::from_unix_time(t as i64, 0)),
            });
        }
        trace!(member = %name, "extracted");
    }
    finish_dirs(dirs)?;
    Ok(())
}

pub(super) fn unpack_tar(archive: &Path, extract_dir: &Path) -> FsResult<()> {
    let file = File::open(archive)?;
    unpack_tar_stream(archive, file, extract_dir)
}

pub(super) fn unpack_gztar(archive: &Path, extract_dir: &Path) -> FsResult<()> {
    let file = File::open(archive)?;
    unpack_tar_stream(archive, GzDecoder::new(file), extract_dir)
}

pub(super) fn unpack_zip(archive: &Path, extract_dir: &Path) -> FsResult<()> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| read_error(archive, e))?;
    fs::create_dir_all(extract_dir)?;

    let mut dirs = Vec::new();
    for i in 0..zip.len() {
        let mut member = zip.by_index(i).map_err(|e| read_error(archive, e))?;
        let Some(rel) = member.enclosed_name() else {
            return Err(FsError::Read(format!(
                "archive member {} would be extracted outside {}",
                member.name(),
                extract_dir.display()
            )));
        };
        let target = extract_dir.join(rel);
        if member.is_dir() {
            fs::create_dir_all(&target)?;
            dirs.push(DeferredDir {
                path: target,
                mode: member.unix_mode(),
                mtime: None,
            });
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut member, &mut out)?;
            apply_unix_mode(&target, member.unix_mode())?;
        }
        trace!(member = %member.name(), "extracted");
    }
    finish_dirs(dirs)?;
    Ok(())
}

fn apply_unix_mode(target: &Path, mode: Option<u32>) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = mode {
            fs::set_permissions(target, fs::Permissions::from_mode(mode & 0o7777))?;
        }
    }
    #[cfg(not(unix))]
    {
        let _ = (target, mode);
    }
    Ok(())
}
