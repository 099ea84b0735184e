//! Platform-specific helpers.
//! Hides OS differences behind a small uniform API:
//! - access checks for `which`
//! - log file opening
//! - user/group name lookup (Unix) and the machine configuration store
//!   (Windows registry)

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::{is_accessible, lookup_group, lookup_user, open_log_file_append};

#[cfg(windows)]
pub use windows::{is_accessible, open_log_file_append, read_machine_dword, write_machine_dword};

/// Access bits understood by [`is_accessible`].
pub const ACCESS_EXISTS: u8 = 0;
pub const ACCESS_EXECUTE: u8 = 1;
pub const ACCESS_WRITE: u8 = 2;
pub const ACCESS_READ: u8 = 4;
