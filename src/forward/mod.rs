//! Drop-in forwarder over `fs_ops`.
//!
//! Each method normalizes the path arguments its `OPERATIONS` row declares,
//! hands everything to the native operation and returns whatever comes back.
//! Errors are not wrapped, so `FsError` variants and `io::ErrorKind`s match a
//! direct call.

mod table;

pub use table::{Operation, OperationSpec, PathArg, OPERATIONS};

use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::config::Config;
use crate::errors::FsResult;
use crate::fs_ops::{
    self, AccessMode, ArchiveWriter, CopyFn, CopyTreeOptions, DiskUsage, IgnoreFn, MakeArchiveOptions, Owner,
    RmTreeOptions, UnpackFn,
};
use crate::normalize::{LongPathNormalizer, PathNormalizer};

/// File-management operations with long-path-safe path arguments.
#[derive(Debug, Clone, Default)]
pub struct LongPathFs<N = LongPathNormalizer> {
    normalizer: N,
}

impl LongPathFs {
    /// Forwarder with the default normalizer for this host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwarder with the normalizer described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::with_normalizer(config.normalizer())
    }
}

impl<N: PathNormalizer> LongPathFs<N> {
    pub fn with_normalizer(normalizer: N) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &N {
        &self.normalizer
    }

    /// Normalize the required path arguments of `op`.
    fn paths<const K: usize>(&self, op: Operation, args: [&Path; K]) -> [PathBuf; K] {
        let spec = table::spec(op);
        debug_assert_eq!(
            K,
            spec.required.len(),
            "{} forwards {} path argument(s) but declares {:?}",
            spec.name,
            K,
            spec.required
        );
        trace!(op = spec.name, "forwarding");
        args.map(|p| self.normalizer.normalize(p))
    }

    /// Normalize the optional path argument of `op` when supplied.
    fn optional_path(&self, op: Operation, arg: Option<&Path>) -> Option<PathBuf> {
        let spec = table::spec(op);
        debug_assert_eq!(spec.optional.len(), 1, "{} declares no optional path", spec.name);
        arg.map(|p| self.normalizer.normalize(p))
    }

    /// Operations without path arguments still go through the table.
    fn direct(&self, op: Operation) {
        let spec = table::spec(op);
        debug_assert!(spec.required.is_empty() && spec.optional.is_empty());
        trace!(op = spec.name, "forwarding");
    }

    pub fn copyfileobj<R, W>(&self, src: &mut R, dst: &mut W, length: usize) -> io::Result<u64>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        self.direct(Operation::CopyFileObj);
        fs_ops::copyfileobj(src, dst, length)
    }

    pub fn copyfile(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<PathBuf> {
        let [src, dst] = self.paths(Operation::CopyFile, [src.as_ref(), dst.as_ref()]);
        fs_ops::copyfile(src, dst, follow_symlinks)
    }

    pub fn copymode(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<()> {
        let [src, dst] = self.paths(Operation::CopyMode, [src.as_ref(), dst.as_ref()]);
        fs_ops::copymode(src, dst, follow_symlinks)
    }

    pub fn copystat(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<()> {
        let [src, dst] = self.paths(Operation::CopyStat, [src.as_ref(), dst.as_ref()]);
        fs_ops::copystat(src, dst, follow_symlinks)
    }

    pub fn copy(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<PathBuf> {
        let [src, dst] = self.paths(Operation::Copy, [src.as_ref(), dst.as_ref()]);
        fs_ops::copy(src, dst, follow_symlinks)
    }

    pub fn copy2(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, follow_symlinks: bool) -> FsResult<PathBuf> {
        let [src, dst] = self.paths(Operation::Copy2, [src.as_ref(), dst.as_ref()]);
        fs_ops::copy2(src, dst, follow_symlinks)
    }

    pub fn copytree(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, options: &CopyTreeOptions) -> FsResult<PathBuf> {
        let [src, dst] = self.paths(Operation::CopyTree, [src.as_ref(), dst.as_ref()]);
        fs_ops::copytree(src, dst, options)
    }

    pub fn move_path(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>, copy_function: Option<CopyFn>) -> FsResult<PathBuf> {
        let [src, dst] = self.paths(Operation::Move, [src.as_ref(), dst.as_ref()]);
        fs_ops::move_path(src, dst, copy_function)
    }

    pub fn rmtree(&self, path: impl AsRef<Path>, options: &RmTreeOptions) -> FsResult<()> {
        let [path] = self.paths(Operation::RmTree, [path.as_ref()]);
        fs_ops::rmtree(path, options)
    }

    pub fn disk_usage(&self, path: impl AsRef<Path>) -> FsResult<DiskUsage> {
        let [path] = self.paths(Operation::DiskUsage, [path.as_ref()]);
        fs_ops::disk_usage(path)
    }

    pub fn chown(&self, path: impl AsRef<Path>, user: Option<Owner>, group: Option<Owner>, follow_symlinks: bool) -> FsResult<()> {
        let [path] = self.paths(Operation::Chown, [path.as_ref()]);
        fs_ops::chown(path, user, group, follow_symlinks)
    }

    pub fn which(&self, cmd: impl AsRef<OsStr>, mode: AccessMode, search_path: Option<&OsStr>) -> Option<PathBuf> {
        self.direct(Operation::Which);
        fs_ops::which(cmd, mode, search_path)
    }

    pub fn ignore_patterns<S: AsRef<str>>(&self, patterns: &[S]) -> FsResult<IgnoreFn> {
        self.direct(Operation::IgnorePatterns);
        fs_ops::ignore_patterns(patterns)
    }

    pub fn get_archive_formats(&self) -> Vec<(String, String)> {
        self.direct(Operation::GetArchiveFormats);
        fs_ops::get_archive_formats()
    }

    pub fn register_archive_format(&self, name: &str, writer: ArchiveWriter, description: &str) {
        self.direct(Operation::RegisterArchiveFormat);
        fs_ops::register_archive_format(name, writer, description)
    }

    pub fn unregister_archive_format(&self, name: &str) -> FsResult<()> {
        self.direct(Operation::UnregisterArchiveFormat);
        fs_ops::unregister_archive_format(name)
    }

    pub fn get_unpack_formats(&self) -> Vec<(String, Vec<String>, String)> {
        self.direct(Operation::GetUnpackFormats);
        fs_ops::get_unpack_formats()
    }

    pub fn register_unpack_format(&self, name: &str, extensions: &[&str], unpacker: UnpackFn, description: &str) -> FsResult<()> {
        self.direct(Operation::RegisterUnpackFormat);
        fs_ops::register_unpack_format(name, extensions, unpacker, description)
    }

    pub fn unregister_unpack_format(&self, name: &str) -> FsResult<()> {
        self.direct(Operation::UnregisterUnpackFormat);
        fs_ops::unregister_unpack_format(name)
    }

    pub fn make_archive(&self, base_name: impl AsRef<Path>, format: &str, options: &MakeArchiveOptions) -> FsResult<PathBuf> {
        let [base_name] = self.paths(Operation::MakeArchive, [base_name.as_ref()]);
        let options = MakeArchiveOptions {
            root_dir: self.optional_path(Operation::MakeArchive, options.root_dir.as_deref()),
            base_dir: options.base_dir.clone(),
            dry_run: options.dry_run,
        };
        fs_ops::make_archive(base_name, format, &options)
    }

    pub fn unpack_archive(&self, filename: impl AsRef<Path>, extract_dir: Option<&Path>, format: Option<&str>) -> FsResult<()> {
        let [filename] = self.paths(Operation::UnpackArchive, [filename.as_ref()]);
        let extract_dir = self.optional_path(Operation::UnpackArchive, extract_dir);
        fs_ops::unpack_archive(filename, extract_dir.as_deref(), format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{Capability, WorkingDir};
    use std::sync::Mutex;

    /// Records every path it is asked to normalize and returns it unchanged.
    #[derive(Default)]
    struct Recording(Mutex<Vec<PathBuf>>);

    impl PathNormalizer for Recording {
        fn normalize(&self, path: &Path) -> PathBuf {
            self.0.lock().unwrap().push(path.to_path_buf());
            path.to_path_buf()
        }
    }

    #[test]
    fn copyfile_normalizes_both_paths() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a");
        let dst = dir.path().join("b");
        std::fs::write(&src, b"x").unwrap();

        let fs = LongPathFs::with_normalizer(Recording::default());
        fs.copyfile(&src, &dst, true).unwrap();
        assert_eq!(*fs.normalizer().0.lock().unwrap(), vec![src, dst]);
    }

    #[test]
    fn make_archive_leaves_base_dir_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/f.txt"), b"f").unwrap();
        let base = dir.path().join("out");

        let fs = LongPathFs::with_normalizer(Recording::default());
        let options = MakeArchiveOptions {
            root_dir: Some(dir.path().to_path_buf()),
            base_dir: Some(PathBuf::from("pkg")),
            dry_run: true,
        };
        fs.make_archive(&base, "tar", &options).unwrap();
        assert_eq!(*fs.normalizer().0.lock().unwrap(), vec![base, dir.path().to_path_buf()]);
    }

    #[test]
    fn direct_operations_touch_no_paths() {
        let fs = LongPathFs::with_normalizer(Recording::default());
        let _ = fs.get_archive_formats();
        let _ = fs.which("definitely-not-a-command", AccessMode::default(), Some(OsStr::new("")));
        assert!(fs.normalizer().0.lock().unwrap().is_empty());
    }

    #[test]
    fn unrestricted_forwarder_matches_native_errors() {
        let fs = LongPathFs::with_normalizer(
            LongPathNormalizer::new()
                .with_capability(Capability::Unrestricted)
                .with_working_dir(WorkingDir::Fixed(r"C:\work".into())),
        );
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let native = fs_ops::copyfile(&missing, dir.path().join("x"), true).unwrap_err();
        let forwarded = fs.copyfile(&missing, dir.path().join("x"), true).unwrap_err();
        assert_eq!(native.io_kind(), forwarded.io_kind());
        assert_eq!(native.to_string(), forwarded.to_string());
    }
}
