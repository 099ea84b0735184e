//! The machine-wide long-path switch.
//!
//! Windows only lifts `MAX_PATH` for applications when
//! `HKLM\SYSTEM\CurrentControlSet\Control\FileSystem\LongPathsEnabled` is `1`.
//! Changing it needs administrative rights; reading it does not.

use std::io;
use tracing::{debug, info};

use crate::errors::RegistryError;

pub const FILESYSTEM_KEY: &str = r"SYSTEM\CurrentControlSet\Control\FileSystem";
pub const LONG_PATHS_VALUE: &str = "LongPathsEnabled";

/// Storage for the `LongPathsEnabled` DWORD.
pub trait LongPathSetting {
    /// Current value; `None` when the value does not exist.
    fn read(&self) -> Result<Option<u32>, RegistryError>;
    fn write(&self, value: u32) -> Result<(), RegistryError>;
}

/// The real Windows registry. Every call is `Unsupported` on other hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRegistry;

#[cfg_attr(not(any(windows, test)), allow(dead_code))]
fn map_os(e: io::Error) -> RegistryError {
    if e.kind() == io::ErrorKind::PermissionDenied {
        RegistryError::PermissionDenied(format!(r"HKLM\{FILESYSTEM_KEY}\{LONG_PATHS_VALUE}"))
    } else {
        RegistryError::Os(e)
    }
}

#[cfg(windows)]
impl LongPathSetting for SystemRegistry {
    fn read(&self) -> Result<Option<u32>, RegistryError> {
        crate::platform::read_machine_dword(FILESYSTEM_KEY, LONG_PATHS_VALUE).map_err(map_os)
    }

    fn write(&self, value: u32) -> Result<(), RegistryError> {
        crate::platform::write_machine_dword(FILESYSTEM_KEY, LONG_PATHS_VALUE, value).map_err(map_os)
    }
}

#[cfg(not(windows))]
impl LongPathSetting for SystemRegistry {
    fn read(&self) -> Result<Option<u32>, RegistryError> {
        Err(RegistryError::Unsupported)
    }

    fn write(&self, _value: u32) -> Result<(), RegistryError> {
        Err(RegistryError::Unsupported)
    }
}

fn set_switch<S: LongPathSetting + ?Sized>(store: &S, enabled: bool) -> Result<bool, RegistryError> {
    let want = u32::from(enabled);
    let current = store.read()?.unwrap_or(0);
    if (current != 0) == enabled {
        debug!(enabled, "long-path switch already set");
        return Ok(false);
    }
    store.write(want)?;
    info!(value = want, "updated {LONG_PATHS_VALUE}");
    Ok(true)
}

/// Turn the switch on. `Ok(true)` if it changed, `Ok(false)` if it was already on.
pub fn enable_long_paths<S: LongPathSetting + ?Sized>(store: &S) -> Result<bool, RegistryError> {
    set_switch(store, true)
}

/// Turn the switch off. `Ok(true)` if it changed, `Ok(false)` if it was already off.
pub fn disable_long_paths<S: LongPathSetting + ?Sized>(store: &S) -> Result<bool, RegistryError> {
    set_switch(store, false)
}

/// Whether the switch is on. A missing value counts as off.
pub fn long_paths_enabled<S: LongPathSetting + ?Sized>(store: &S) -> Result<bool, RegistryError> {
    Ok(store.read()?.unwrap_or(0) != 0)
}

/// [`enable_long_paths`] against the system registry.
pub fn enable_long_paths_on_registry() -> Result<bool, RegistryError> {
    enable_long_paths(&SystemRegistry)
}

pub fn disable_long_paths_on_registry() -> Result<bool, RegistryError> {
    disable_long_paths(&SystemRegistry)
}

pub fn is_long_paths_enabled_on_registry() -> Result<bool, RegistryError> {
    long_paths_enabled(&SystemRegistry)
}
