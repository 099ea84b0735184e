//! Ownership changes.

use std::io;
use std::path::Path;

use crate::errors::FsResult;

/// A user or group, by numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Id(u32),
    Name(String),
}

impl From<u32> for Owner {
    fn from(id: u32) -> Self {
        Owner::Id(id)
    }
}

impl From<&str> for Owner {
    fn from(name: &str) -> Self {
        Owner::Name(name.to_string())
    }
}

/// Change owner user and/or group of `path`. At least one must be given.
///
/// Unsupported on Windows.
pub fn chown(path: impl AsRef<Path>, user: Option<Owner>, group: Option<Owner>, follow_symlinks: bool) -> FsResult<()> {
    let path = path.as_ref();
    if user.is_none() && group.is_none() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "user and/or group must be set").into());
    }
    imp::chown(path, user, group, follow_symlinks)
}

#[cfg(unix)]
mod imp {
    use super::*;
    use crate::platform::{lookup_group, lookup_user};
    use tracing::debug;

    pub(super) fn chown(path: &Path, user: Option<Owner>, group: Option<Owner>, follow_symlinks: bool) -> FsResult<()> {
        let uid = match user {
            Some(Owner::Id(id)) => Some(id),
            Some(Owner::Name(name)) => Some(lookup_user(&name)?),
            None => None,
        };
        let gid = match group {
            Some(Owner::Id(id)) => Some(id),
            Some(Owner::Name(name)) => Some(lookup_group(&name)?),
            None => None,
        };
        if follow_symlinks {
            std::os::unix::fs::chown(path, uid, gid)?;
        } else {
            std::os::unix::fs::lchown(path, uid, gid)?;
        }
        debug!(path = %path.display(), ?uid, ?gid, "changed owner");
        Ok(())
    }
}

#[cfg(not(unix))]
mod imp {
    use super::*;

    pub(super) fn chown(_path: &Path, _user: Option<Owner>, _group: Option<Owner>, _follow: bool) -> FsResult<()> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "chown is not supported on this platform").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn needs_user_or_group() {
        let dir = tempdir().unwrap();
        let err = chown(dir.path(), None, None, true).unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::InvalidInput));
    }

    #[cfg(unix)]
    #[test]
    fn chown_to_current_owner_succeeds() {
        use std::os::unix::fs::MetadataExt;
        let dir = tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();
        let meta = std::fs::metadata(&file).unwrap();

        chown(&file, Some(Owner::Id(meta.uid())), Some(Owner::Id(meta.gid())), true).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn unknown_user_name_is_not_found() {
        let dir = tempdir().unwrap();
        let err = chown(dir.path(), Some("no-such-user-long-path-fs".into()), None, true).unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }
}
