//! Typed error definitions for long_path_fs.
//!
//! `FsError` is what the native operations return; the forwarder hands it back
//! untouched so callers see the same variants either way.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{src} and {dst} are the same file")]
    SameFile { src: PathBuf, dst: PathBuf },

    #[error("`{0}` is a named pipe")]
    SpecialFile(PathBuf),

    #[error("Destination path '{0}' already exists")]
    DestinationExists(PathBuf),

    #[error("Cannot move a directory '{src}' into itself '{dst}'")]
    MoveIntoSelf { src: PathBuf, dst: PathBuf },

    #[error("Cannot call rmtree on a symbolic link: {0}")]
    SymlinkRoot(PathBuf),

    /// Every failure collected while copying a tree.
    #[error("{} error(s) while copying tree", .0.len())]
    Tree(Vec<TreeFailure>),

    #[error("unknown archive format '{0}'")]
    UnknownFormat(String),

    #[error("{0}")]
    Read(String),

    #[error("{0}")]
    Registry(String),
}

impl FsError {
    /// The `io::ErrorKind` behind this error, when there is one.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            FsError::Io(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// One failed entry inside a tree copy.
#[derive(Debug)]
pub struct TreeFailure {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub reason: String,
}

/// Outcomes of the administrative long-path switch that are not plain success.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("insufficient privilege to change '{0}'; run elevated")]
    PermissionDenied(String),

    #[error("long-path registry setting is not available on this platform")]
    Unsupported,

    #[error("registry access failed: {0}")]
    Os(#[from] io::Error),
}

impl RegistryError {
    /// Short stable code for logs and exit statuses.
    pub fn code(&self) -> i32 {
        match self {
            RegistryError::PermissionDenied(_) => 77,
            RegistryError::Unsupported => 69,
            RegistryError::Os(_) => 74,
        }
    }
}

pub type FsResult<T> = Result<T, FsError>;
