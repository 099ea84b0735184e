//! Executable lookup over a search path.

use std::env;
use std::ffi::{OsStr, OsString};
use std::ops::BitOr;
use std::path::{Path, PathBuf};

use crate::platform;

/// Access requirement for a `which` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessMode(u8);

impl AccessMode {
    pub const EXISTS: AccessMode = AccessMode(platform::ACCESS_EXISTS);
    pub const EXECUTE: AccessMode = AccessMode(platform::ACCESS_EXECUTE);
    pub const WRITE: AccessMode = AccessMode(platform::ACCESS_WRITE);
    pub const READ: AccessMode = AccessMode(platform::ACCESS_READ);

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl Default for AccessMode {
    fn default() -> Self {
        AccessMode::EXISTS | AccessMode::EXECUTE
    }
}

impl BitOr for AccessMode {
    type Output = AccessMode;
    fn bitor(self, rhs: Self) -> Self {
        AccessMode(self.0 | rhs.0)
    }
}

fn matches(candidate: &Path, mode: AccessMode) -> bool {
    candidate.exists() && !candidate.is_dir() && platform::is_accessible(candidate, mode.bits())
}

/// Find `cmd` on `search_path` (default: the `PATH` environment variable).
///
/// A `cmd` containing a directory separator is checked as given. On Windows
/// the `PATHEXT` extensions are tried and the current directory is searched
/// first.
pub fn which(cmd: impl AsRef<OsStr>, mode: AccessMode, search_path: Option<&OsStr>) -> Option<PathBuf> {
    let cmd = Path::new(cmd.as_ref());
    let exts = pathext();

    if cmd.components().count() > 1 {
        return candidates(cmd, &exts).into_iter().find(|c| matches(c, mode));
    }

    let path_var: OsString = match search_path {
        Some(p) => p.to_os_string(),
        None => env::var_os("PATH").unwrap_or_default(),
    };
    let mut dirs: Vec<PathBuf> = env::split_paths(&path_var)
        .filter(|d| !d.as_os_str().is_empty())
        .collect();
    if cfg!(windows) {
        dirs.insert(0, PathBuf::from("."));
    }

    let mut seen = Vec::new();
    for dir in dirs {
        if seen.contains(&dir) {
            continue;
        }
        for candidate in candidates(&dir.join(cmd), &exts) {
            if matches(&candidate, mode) {
                return Some(candidate);
            }
        }
        seen.push(dir);
    }
    None
}

/// `base` itself plus `base` with each executable extension appended.
/// Windows only; elsewhere just `base`.
fn candidates(base: &Path, exts: &[String]) -> Vec<PathBuf> {
    if exts.is_empty() {
        return vec![base.to_path_buf()];
    }
    let name = base.to_string_lossy().to_lowercase();
    if exts.iter().any(|e| name.ends_with(e.as_str())) {
        return vec![base.to_path_buf()];
    }
    let mut out = Vec::with_capacity(exts.len());
    for ext in exts {
        let mut s = base.as_os_str().to_os_string();
        s.push(ext);
        out.push(PathBuf::from(s));
    }
    out
}

fn pathext() -> Vec<String> {
    if !cfg!(windows) {
        return Vec::new();
    }
    let raw = env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    raw.split(';')
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
        .collect()
}
