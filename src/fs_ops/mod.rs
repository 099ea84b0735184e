//! Native file-management operations.
//!
//! These are the plain operations that `LongPathFs` delegates to: they take
//! paths exactly as given and report failures as `FsError` without touching
//! the path strings. Names follow the familiar high-level file-utility surface
//! (`copyfile`, `copy2`, `copytree`, `rmtree`, `make_archive`, ...).

mod archive;
mod copy;
mod disk;
mod io_copy;
mod metadata;
mod owner;
mod relocate;
mod rmtree;
mod tree;
mod util;
mod which;

pub use archive::{
    get_archive_formats, get_unpack_formats, make_archive, register_archive_format,
    register_unpack_format, unpack_archive, unregister_archive_format, unregister_unpack_format,
    ArchiveJob, ArchiveWriter, MakeArchiveOptions, UnpackFn,
};
pub use copy::{copy, copy2, copyfile};
pub use disk::{disk_usage, DiskUsage};
pub use io_copy::{copyfileobj, COPY_BUFSIZE};
pub use metadata::{copymode, copystat};
pub use owner::{chown, Owner};
pub use relocate::move_path;
pub use rmtree::{rmtree, OnExc, RmOp, RmTreeOptions};
pub use tree::{copytree, ignore_patterns, CopyFn, CopyTreeOptions, IgnoreFn};
pub use which::{which, AccessMode};
