//! Windows implementations of platform helpers.
//!
//! Notes:
//! - Windows lacks POSIX mode semantics; write access is approximated by the
//!   readonly attribute and execute access by existence (PATHEXT decides
//!   executability in `which`).
//! - Registry access goes through `windows-sys`; an open key is closed on drop.

use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS};
use windows_sys::Win32::System::Registry::{
    HKEY, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE, REG_DWORD, REG_SAM_FLAGS, RegCloseKey,
    RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
};

use super::ACCESS_WRITE;

/// Open log file for appending (no permission tightening available via std).
pub fn open_log_file_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn is_accessible(path: &Path, mode: u8) -> bool {
    match fs::metadata(path) {
        Ok(meta) => mode & ACCESS_WRITE == 0 || !meta.permissions().readonly(),
        Err(_) => false,
    }
}

fn wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(Some(0)).collect()
}

fn check(code: u32) -> io::Result<()> {
    if code == ERROR_SUCCESS {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(code as i32))
    }
}

/// An open registry key, closed on drop.
struct RegKey(HKEY);

impl RegKey {
    fn open_machine(subkey: &str, access: REG_SAM_FLAGS) -> io::Result<Self> {
        let subkey = wide(subkey);
        let mut handle: HKEY = ptr::null_mut();
        // SAFETY: subkey is NUL-terminated and handle is a valid out pointer.
        let rc = unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, subkey.as_ptr(), 0, access, &mut handle) };
        check(rc)?;
        Ok(RegKey(handle))
    }
}

impl Drop for RegKey {
    fn drop(&mut self) {
        // SAFETY: the handle came from a successful RegOpenKeyExW.
        unsafe {
            RegCloseKey(self.0);
        }
    }
}

/// Read a `REG_DWORD` under `HKEY_LOCAL_MACHINE\<subkey>`. A missing value is `None`.
pub fn read_machine_dword(subkey: &str, value: &str) -> io::Result<Option<u32>> {
    let key = RegKey::open_machine(subkey, KEY_QUERY_VALUE)?;
    let name = wide(value);
    let mut data: u32 = 0;
    let mut size = std::mem::size_of::<u32>() as u32;
    let mut kind = 0;
    // SAFETY: data/size describe a valid 4-byte buffer; name is NUL-terminated.
    let rc = unsafe {
        RegQueryValueExW(
            key.0,
            name.as_ptr(),
            ptr::null(),
            &mut kind,
            (&mut data as *mut u32).cast::<u8>(),
            &mut size,
        )
    };
    if rc == ERROR_FILE_NOT_FOUND {
        return Ok(None);
    }
    check(rc)?;
    if kind != REG_DWORD {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("registry value '{value}' is not a DWORD"),
        ));
    }
    Ok(Some(data))
}

/// Write a `REG_DWORD` under `HKEY_LOCAL_MACHINE\<subkey>`.
pub fn write_machine_dword(subkey: &str, value: &str, data: u32) -> io::Result<()> {
    let key = RegKey::open_machine(subkey, KEY_SET_VALUE)?;
    let name = wide(value);
    let bytes = data.to_le_bytes();
    // SAFETY: bytes is a 4-byte buffer matching REG_DWORD; name is NUL-terminated.
    let rc = unsafe { RegSetValueExW(key.0, name.as_ptr(), 0, REG_DWORD, bytes.as_ptr(), bytes.len() as u32) };
    check(rc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn readonly_blocks_write_access() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ro.txt");
        fs::write(&path, b"x").unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&path, perms).unwrap();

        assert!(is_accessible(&path, super::super::ACCESS_READ));
        assert!(!is_accessible(&path, ACCESS_WRITE));
    }

    #[test]
    fn missing_registry_value_reads_as_none() {
        let got = read_machine_dword(r"SYSTEM\CurrentControlSet\Control\FileSystem", "NoSuchValueLongPathFs").unwrap();
        assert_eq!(got, None);
    }
}
