//! Path normalization for the legacy Windows path-length limit.
//!
//! `LongPathNormalizer` rewrites a caller's path into the escape-prefixed form
//! (`\\?\C:\...`, `\\?\UNC\server\share\...`) that the Win32 file APIs accept
//! past `MAX_PATH`. Once prefixed, Windows takes the path literally, so the
//! rewrite also makes it absolute, switches separators to `\`, collapses
//! repeats and resolves `.`/`..` segments.
//!
//! Normalization is total: anything it does not recognize comes back as-is
//! and the filesystem operation reports the real error.

mod windows_path;

use std::path::{Path, PathBuf};
use tracing::debug;

pub use windows_path::{VERBATIM_PREFIX, VERBATIM_UNC_PREFIX};

/// Historical `MAX_PATH`.
pub const LEGACY_MAX_PATH: usize = 260;

/// Directory paths must leave room for an 8.3 file name (`MAX_PATH - 12`).
pub const LEGACY_DIR_LIMIT: usize = LEGACY_MAX_PATH - 12;

/// Path normalization for platform-specific requirements.
pub trait PathNormalizer {
    /// Normalize path for the platform (e.g., Windows long path support).
    fn normalize(&self, path: &Path) -> PathBuf;
}

/// Whether the target OS enforces the legacy path-length limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Windows: paths need the escape prefix to pass `MAX_PATH`.
    LegacyPathLimit,
    /// Everything else: the prefix is meaningless, normalization is a no-op.
    Unrestricted,
}

impl Capability {
    /// Capability of the OS this binary was built for.
    pub fn detect() -> Self {
        if cfg!(windows) {
            Capability::LegacyPathLimit
        } else {
            Capability::Unrestricted
        }
    }
}

impl Default for Capability {
    fn default() -> Self {
        Self::detect()
    }
}

/// Base directory for relative inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkingDir {
    /// Read `std::env::current_dir()` at normalization time.
    #[default]
    Process,
    /// A fixed Windows-style absolute directory.
    Fixed(String),
}

impl WorkingDir {
    fn read(&self) -> Option<String> {
        match self {
            WorkingDir::Process => std::env::current_dir()
                .ok()
                .and_then(|p| p.to_str().map(str::to_owned)),
            WorkingDir::Fixed(dir) => Some(dir.clone()),
        }
    }
}

/// When the escape prefix is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefixPolicy {
    /// Prefix every applicable path regardless of length.
    #[default]
    Always,
    /// Leave paths shorter than [`LEGACY_DIR_LIMIT`] untouched.
    WhenLong,
}

impl PrefixPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Some(PrefixPolicy::Always),
            "when_long" | "when-long" | "long" => Some(PrefixPolicy::WhenLong),
            _ => None,
        }
    }
}

/// The default normalizer. Stateless apart from its construction-time settings.
#[derive(Debug, Clone, Default)]
pub struct LongPathNormalizer {
    capability: Capability,
    working_dir: WorkingDir,
    policy: PrefixPolicy,
}

impl LongPathNormalizer {
    /// Host capability, process working directory, `Always` policy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_working_dir(mut self, working_dir: WorkingDir) -> Self {
        self.working_dir = working_dir;
        self
    }

    pub fn with_policy(mut self, policy: PrefixPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn policy(&self) -> PrefixPolicy {
        self.policy
    }

    /// String-level normalization; see the module docs for the rules.
    pub fn normalize_str(&self, path: &str) -> String {
        if self.capability == Capability::Unrestricted || path.is_empty() {
            return path.to_owned();
        }

        let cwd = if windows_path::needs_base(path) {
            self.working_dir.read()
        } else {
            None
        };
        let cwd = cwd.as_deref().map(windows_path::strip_verbatim);

        let Some(resolved) = windows_path::absolutize(path, cwd.as_deref()) else {
            return path.to_owned();
        };

        if self.policy == PrefixPolicy::WhenLong {
            let units = resolved.render().encode_utf16().count();
            if units < LEGACY_DIR_LIMIT {
                return path.to_owned();
            }
        }

        let out = resolved.to_verbatim();
        debug!(path, normalized = %out, "added long-path prefix");
        out
    }
}

impl PathNormalizer for LongPathNormalizer {
    fn normalize(&self, path: &Path) -> PathBuf {
        match path.to_str() {
            Some(s) => PathBuf::from(self.normalize_str(s)),
            // not valid Unicode: leave it for the OS to judge
            None => path.to_path_buf(),
        }
    }
}

/// Normalize with host defaults.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    LongPathNormalizer::new().normalize(path.as_ref())
}

/// Drop a verbatim prefix when the plain form means the same thing.
/// Identity on non-Windows hosts.
pub fn simplify(path: &Path) -> PathBuf {
    dunce::simplified(path).to_path_buf()
}

/// True for `C:\...`, `\\server\share\...` and escape-prefixed paths, i.e.
/// anything usable as a fixed working directory.
pub fn is_windows_absolute(path: &str) -> bool {
    matches!(
        windows_path::classify(path),
        windows_path::Shape::Absolute { .. } | windows_path::Shape::Namespaced
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn win(cwd: &str) -> LongPathNormalizer {
        LongPathNormalizer::new()
            .with_capability(Capability::LegacyPathLimit)
            .with_working_dir(WorkingDir::Fixed(cwd.to_string()))
    }

    #[test]
    fn local_absolute_gets_prefix() {
        assert_eq!(win(r"C:\cwd").normalize_str(r"C:\a\b"), r"\\?\C:\a\b");
    }

    #[test]
    fn unc_gets_unc_prefix() {
        assert_eq!(
            win(r"C:\cwd").normalize_str(r"\\server\share\x"),
            r"\\?\UNC\server\share\x"
        );
    }

    #[test]
    fn relative_resolves_against_working_dir() {
        assert_eq!(win(r"C:\cwd").normalize_str(r"a\b"), r"\\?\C:\cwd\a\b");
        assert_eq!(win(r"C:\cwd").normalize_str(r"..\x"), r"\\?\C:\x");
        assert_eq!(win(r"\\srv\sh\w").normalize_str("f.txt"), r"\\?\UNC\srv\sh\w\f.txt");
    }

    #[test]
    fn root_relative_uses_working_dir_root() {
        assert_eq!(win(r"D:\deep\cwd").normalize_str(r"\top"), r"\\?\D:\top");
    }

    #[test]
    fn drive_relative_only_on_same_drive() {
        assert_eq!(win(r"C:\cwd").normalize_str("c:sub"), r"\\?\c:\cwd\sub");
        assert_eq!(win(r"C:\cwd").normalize_str("D:sub"), "D:sub");
    }

    #[test]
    fn trailing_dots_and_spaces_are_trimmed() {
        assert_eq!(win(r"C:\cwd").normalize_str(r"C:\dir.\file "), r"\\?\C:\dir\file");
        assert_eq!(win(r"C:\cwd").normalize_str(r"notes. . "), r"\\?\C:\cwd\notes");
        assert_eq!(win(r"C:\cwd").normalize_str(r"C:\a\...\b"), r"\\?\C:\a\b");
        // leading dots are part of the name
        assert_eq!(win(r"C:\cwd").normalize_str(r"C:\.hidden"), r"\\?\C:\.hidden");
    }

    #[test]
    fn verbatim_working_dir_is_accepted() {
        assert_eq!(win(r"\\?\C:\cwd").normalize_str("a"), r"\\?\C:\cwd\a");
    }

    #[test]
    fn separators_are_canonicalized() {
        let n = win(r"C:\cwd");
        assert_eq!(n.normalize_str("C:/a//b"), n.normalize_str(r"C:\a\b"));
        assert_eq!(n.normalize_str(r"C:\a\b\"), r"\\?\C:\a\b");
        assert_eq!(n.normalize_str(r"C:\a\.\b"), r"\\?\C:\a\b");
    }

    #[test]
    fn prefixed_and_empty_pass_through() {
        let n = win(r"C:\cwd");
        assert_eq!(n.normalize_str(r"\\?\C:\a\b"), r"\\?\C:\a\b");
        assert_eq!(n.normalize_str(r"\\.\pipe\x"), r"\\.\pipe\x");
        assert_eq!(n.normalize_str(""), "");
    }

    #[test]
    fn unrecognized_passes_through() {
        let n = win(r"C:\cwd");
        assert_eq!(n.normalize_str(r"\\lonely"), r"\\lonely");
        let no_base = win("/not/windows");
        assert_eq!(no_base.normalize_str(r"a\b"), r"a\b");
    }

    #[test]
    fn unrestricted_is_identity() {
        let n = LongPathNormalizer::new().with_capability(Capability::Unrestricted);
        for p in [r"C:\a", "a/b", r"\\srv\share", "", r"\\?\C:\x"] {
            assert_eq!(n.normalize_str(p), p);
        }
    }

    #[test]
    fn when_long_skips_short_paths() {
        let n = win(r"C:\cwd").with_policy(PrefixPolicy::WhenLong);
        assert_eq!(n.normalize_str(r"C:\short"), r"C:\short");
        let long = format!(r"C:\{}", "x".repeat(LEGACY_MAX_PATH));
        assert_eq!(n.normalize_str(&long), format!(r"\\?\{long}"));
    }

    #[test]
    fn idempotent_over_samples() {
        let n = win(r"C:\cwd");
        for p in [
            r"C:\a\b",
            "C:/x//y/",
            r"\\srv\share\p",
            r"rel\p",
            r"\root",
            "c:drive",
            r"\\?\C:\done",
            "",
            r"\\bad",
        ] {
            let once = n.normalize_str(p);
            assert_eq!(n.normalize_str(&once), once, "input {p:?}");
        }
    }

    #[test]
    fn policy_parse() {
        assert_eq!(PrefixPolicy::parse("Always"), Some(PrefixPolicy::Always));
        assert_eq!(PrefixPolicy::parse("when_long"), Some(PrefixPolicy::WhenLong));
        assert_eq!(PrefixPolicy::parse("sometimes"), None);
    }
}
