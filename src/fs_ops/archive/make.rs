//! Built-in archive writers.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::ArchiveJob;
use crate::errors::{FsError, FsResult};

/// One filesystem entry to store, with its name inside the archive.
struct Member {
    path: PathBuf,
    name: String,
    is_dir: bool,
}

fn archive_path(base_name: &Path, ext: &str) -> PathBuf {
    let mut s = base_name.as_os_str().to_os_string();
    s.push(ext);
    PathBuf::from(s)
}

/// `root_dir/base_dir` without `.` components, which verbatim paths would
/// take literally.
fn walk_root(root_dir: &Path, base_dir: &Path) -> PathBuf {
    let mut out = root_dir.to_path_buf();
    for comp in base_dir.components() {
        if comp != Component::CurDir {
            out.push(comp);
        }
    }
    out
}

/// Archive-internal name: `/`-separated, no leading `./`.
fn member_name(base_dir: &Path, rel: &Path) -> String {
    base_dir
        .components()
        .chain(rel.components())
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Walk the job's subtree in a stable order, skipping the archive itself.
fn collect_members(job: &ArchiveJob<'_>, archive: &Path, follow_links: bool) -> FsResult<Vec<Member>> {
    let start = walk_root(job.root_dir, job.base_dir);
    let archive_abs = std::path::absolute(archive)?;
    let mut members = Vec::new();
    let walker = WalkDir::new(&start)
        .follow_links(false)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .map(FsError::from)
                .unwrap_or_else(|| FsError::Read("filesystem loop while archiving".to_string()))
        })?;
        let rel = entry.path().strip_prefix(&start).unwrap_or(Path::new(""));
        let name = member_name(job.base_dir, rel);
        if name.is_empty() {
            continue;
        }
        if std::path::absolute(entry.path())? == archive_abs {
            continue;
        }
        let is_dir = if follow_links && entry.path_is_symlink() {
            fs::metadata(entry.path()).map(|m| m.is_dir()).unwrap_or(false)
        } else {
            entry.file_type().is_dir()
        };
        members.push(Member {
            path: entry.into_path(),
            name,
            is_dir,
        });
    }
    Ok(members)
}

fn prepare_output(archive: &Path) -> io::Result<()> {
    if let Some(parent) = archive.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn append_tar<W: Write>(builder: &mut tar::Builder<W>, members: &[Member]) -> io::Result<()> {
    // symlinks are stored as links
    builder.follow_symlinks(false);
    for m in members {
        trace!(member = %m.name, "adding to tar");
        builder.append_path_with_name(&m.path, &m.name)?;
    }
    Ok(())
}

pub(super) fn write_tar(job: &ArchiveJob<'_>) -> FsResult<PathBuf> {
    let archive = archive_path(job.base_name, ".tar");
    if job.dry_run {
        debug!(archive = %archive.display(), "dry run: tar not written");
        return Ok(archive);
    }
    prepare_output(&archive)?;
    let file = File::create(&archive)?;
    let members = collect_members(job, &archive, false)?;
    let mut builder = tar::Builder::new(file);
    append_tar(&mut builder, &members)?;
    builder.into_inner()?.sync_all()?;
    Ok(archive)
}

pub(super) fn write_gztar(job: &ArchiveJob<'_>) -> FsResult<PathBuf> {
    let archive = archive_path(job.base_name, ".tar.gz");
    if job.dry_run {
        debug!(archive = %archive.display(), "dry run: gztar not written");
        return Ok(archive);
    }
    prepare_output(&archive)?;
    let file = File::create(&archive)?;
    let members = collect_members(job, &archive, false)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    append_tar(&mut builder, &members)?;
    builder.into_inner()?.finish()?.sync_all()?;
    Ok(archive)
}

pub(super) fn write_zip(job: &ArchiveJob<'_>) -> FsResult<PathBuf> {
    let archive = archive_path(job.base_name, ".zip");
    if job.dry_run {
        debug!(archive = %archive.display(), "dry run: zip not written");
        return Ok(archive);
    }
    prepare_output(&archive)?;
    let file = File::create(&archive)?;
    let members = collect_members(job, &archive, true)?;
    let mut zip = ZipWriter::new(file);

    for m in &members {
        let mut options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        if let Some(mode) = unix_mode(&m.path) {
            options = options.unix_permissions(mode);
        }
        if m.is_dir {
            zip.add_directory(format!("{}/", m.name), options).map_err(zip_error)?;
        } else {
            zip.start_file(m.name.as_str(), options).map_err(zip_error)?;
            let mut src = File::open(&m.path)?;
            io::copy(&mut src, &mut zip)?;
        }
        trace!(member = %m.name, "added to zip");
    }
    zip.finish().map_err(zip_error)?.sync_all()?;
    Ok(archive)
}

fn zip_error(e: zip::result::ZipError) -> FsError {
    match e {
        zip::result::ZipError::Io(io) => FsError::Io(io),
        other => FsError::Read(other.to_string()),
    }
}

fn unix_mode(path: &Path) -> Option<u32> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).ok().map(|m| m.permissions().mode() & 0o7777)
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_names_drop_current_dir() {
        assert_eq!(member_name(Path::new("."), Path::new("a/b.txt")), "a/b.txt");
        assert_eq!(member_name(Path::new("./pkg"), Path::new("")), "pkg");
        assert_eq!(member_name(Path::new("pkg"), Path::new("sub")), "pkg/sub");
        assert_eq!(member_name(Path::new("."), Path::new("")), "");
    }

    #[test]
    fn walk_root_skips_current_dir() {
        assert_eq!(walk_root(Path::new("/r"), Path::new(".")), PathBuf::from("/r"));
        assert_eq!(walk_root(Path::new("/r"), Path::new("./a/./b")), PathBuf::from("/r/a/b"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("out");
        let job = ArchiveJob {
            base_name: &base,
            root_dir: dir.path(),
            base_dir: Path::new("."),
            dry_run: true,
        };
        assert_eq!(write_zip(&job).unwrap(), dir.path().join("out.zip"));
        assert_eq!(write_gztar(&job).unwrap(), dir.path().join("out.tar.gz"));
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
