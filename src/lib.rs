//! Core library for `long_path_fs`.
//!
//! File-management operations that keep working past the legacy 260-character
//! Windows path limit. `LongPathFs` rewrites path arguments into the
//! escape-prefixed form the OS accepts without that limit and forwards every
//! call to the native operations in [`fs_ops`], returning results and errors
//! untouched. On hosts without the limit the rewrite is a no-op.
//!
//! ```no_run
//! use long_path_fs::{CopyTreeOptions, LongPathFs};
//!
//! let fs = LongPathFs::new();
//! fs.copytree("deeply/nested/src", "deeply/nested/dst", &CopyTreeOptions::default())?;
//! # Ok::<(), long_path_fs::FsError>(())
//! ```

pub mod config;
pub mod errors;
pub mod forward;
pub mod fs_ops;
pub mod logging;
pub mod normalize;
pub mod platform;
pub mod registry;

pub use config::{CapabilityMode, Config, LogLevel, default_config_path, load_config, load_config_from_xml_path};
pub use errors::{FsError, FsResult, RegistryError, TreeFailure};
pub use forward::{LongPathFs, OPERATIONS, Operation, OperationSpec, PathArg};
pub use fs_ops::{
    AccessMode, ArchiveJob, ArchiveWriter, CopyFn, CopyTreeOptions, DiskUsage, IgnoreFn, MakeArchiveOptions, OnExc,
    Owner, RmOp, RmTreeOptions, UnpackFn,
};
pub use logging::init_tracing;
pub use normalize::{
    Capability, LEGACY_DIR_LIMIT, LEGACY_MAX_PATH, LongPathNormalizer, PathNormalizer, PrefixPolicy, WorkingDir,
    normalize, simplify,
};
pub use registry::{
    LongPathSetting, SystemRegistry, disable_long_paths, disable_long_paths_on_registry, enable_long_paths,
    enable_long_paths_on_registry, is_long_paths_enabled_on_registry, long_paths_enabled,
};
