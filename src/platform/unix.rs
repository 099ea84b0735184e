//! Unix implementations of platform helpers.

use std::ffi::CString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::mem::MaybeUninit;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;
use std::ptr;

use super::{ACCESS_EXECUTE, ACCESS_READ, ACCESS_WRITE};

/// Open log file for appending; set 0600 only when creating a new file.
/// An existing file keeps its permissions (e.g. group-readable for log shipping).
pub fn open_log_file_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600) // applies on create
        .open(path)?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

fn c_path(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains null byte"))
}

/// `access(2)` with the given `ACCESS_*` bits; `ACCESS_EXISTS` (0) checks existence only.
pub fn is_accessible(path: &Path, mode: u8) -> bool {
    let Ok(c) = c_path(path) else {
        return false;
    };
    let mut bits = libc::F_OK;
    if mode & ACCESS_READ != 0 {
        bits |= libc::R_OK;
    }
    if mode & ACCESS_WRITE != 0 {
        bits |= libc::W_OK;
    }
    if mode & ACCESS_EXECUTE != 0 {
        bits |= libc::X_OK;
    }
    unsafe { libc::access(c.as_ptr(), bits) == 0 }
}

const LOOKUP_BUF_START: usize = 1024;
const LOOKUP_BUF_MAX: usize = 1 << 20;

/// Resolve a user name to its uid.
pub fn lookup_user(name: &str) -> io::Result<u32> {
    let c_name = CString::new(name)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "user name contains null byte"))?;
    let mut buf: Vec<libc::c_char> = vec![0; LOOKUP_BUF_START];
    loop {
        let mut pwd = MaybeUninit::<libc::passwd>::uninit();
        let mut result: *mut libc::passwd = ptr::null_mut();
        let rc = unsafe {
            libc::getpwnam_r(c_name.as_ptr(), pwd.as_mut_ptr(), buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < LOOKUP_BUF_MAX {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        if result.is_null() {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("no such user: {name}")));
        }
        // SAFETY: getpwnam_r filled `pwd` and pointed `result` at it.
        return Ok(unsafe { (*result).pw_uid });
    }
}

/// Resolve a group name to its gid.
pub fn lookup_group(name: &str) -> io::Result<u32> {
    let c_name = CString::new(name)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "group name contains null byte"))?;
    let mut buf: Vec<libc::c_char> = vec![0; LOOKUP_BUF_START];
    loop {
        let mut grp = MaybeUninit::<libc::group>::uninit();
        let mut result: *mut libc::group = ptr::null_mut();
        let rc = unsafe {
            libc::getgrnam_r(c_name.as_ptr(), grp.as_mut_ptr(), buf.as_mut_ptr(), buf.len(), &mut result)
        };
        if rc == libc::ERANGE && buf.len() < LOOKUP_BUF_MAX {
            buf.resize(buf.len() * 2, 0);
            continue;
        }
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }
        if result.is_null() {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("no such group: {name}")));
        }
        // SAFETY: getgrnam_r filled `grp` and pointed `result` at it.
        return Ok(unsafe { (*result).gr_gid });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn preserve_existing_log_file_mode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, b"hello").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();
        let _f = open_log_file_append(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640, "existing permissions should be preserved");
    }

    #[test]
    fn new_log_file_gets_0600() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new_log.txt");
        let _f = open_log_file_append(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "newly created log file should be 0600");
    }

    #[test]
    fn access_bits() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("run.sh");
        fs::write(&script, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();
        assert!(is_accessible(&script, super::super::ACCESS_EXISTS));
        assert!(is_accessible(&script, ACCESS_READ));
        // root bypasses X_OK only when some execute bit is set
        assert!(!is_accessible(&script, ACCESS_EXECUTE));
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(is_accessible(&script, ACCESS_EXECUTE));
        assert!(!is_accessible(&dir.path().join("missing"), super::super::ACCESS_EXISTS));
    }

    #[test]
    fn root_user_and_group_resolve() {
        assert_eq!(lookup_user("root").unwrap(), 0);
        assert!(lookup_group("no-such-group-long-path-fs").is_err());
    }
}
