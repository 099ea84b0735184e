use long_path_fs::{Capability, LongPathNormalizer, PathNormalizer, PrefixPolicy, WorkingDir, LEGACY_MAX_PATH};
use std::path::Path;

fn windows_at(cwd: &str) -> LongPathNormalizer {
    LongPathNormalizer::new()
        .with_capability(Capability::LegacyPathLimit)
        .with_working_dir(WorkingDir::Fixed(cwd.to_string()))
}

#[test]
fn prefixed_result_for_long_local_path() {
    let n = windows_at(r"C:\cwd");
    let long = format!(r"C:\{}\file.txt", "segment".repeat(50));
    let out = n.normalize_str(&long);
    assert!(out.starts_with(r"\\?\C:\"));
    assert!(out.ends_with(r"\file.txt"));
}

#[test]
fn unc_mapping() {
    let n = windows_at(r"C:\cwd");
    assert_eq!(n.normalize_str(r"\\fileserver\public\docs\a.txt"), r"\\?\UNC\fileserver\public\docs\a.txt");
    assert_eq!(n.normalize_str("//fileserver/public/docs"), r"\\?\UNC\fileserver\public\docs");
}

#[test]
fn already_prefixed_is_untouched() {
    let n = windows_at(r"C:\cwd");
    for p in [r"\\?\C:\a\..\b", r"\\?\UNC\s\sh\x", r"\\.\COM1", r"\??\C:\x"] {
        assert_eq!(n.normalize_str(p), p);
    }
}

#[test]
fn normalization_is_idempotent() {
    let n = windows_at(r"D:\work\dir");
    let inputs = [
        r"C:\Program Files\app",
        r"relative\path\..\file",
        "mixed/slashes\\here",
        r"\rooted",
        r"\\srv\share",
        "d:drive-relative",
        "e:other-drive",
        "",
        r"\\incomplete",
    ];
    for p in inputs {
        let once = n.normalize_str(p);
        assert_eq!(n.normalize_str(&once), once, "not idempotent for {p:?}");
    }
}

#[test]
fn parent_segments_stay_below_root() {
    let n = windows_at(r"C:\cwd");
    assert_eq!(n.normalize_str(r"C:\a\..\..\..\b"), r"\\?\C:\b");
    assert_eq!(n.normalize_str(r"\\srv\share\..\..\x"), r"\\?\UNC\srv\share\x");
}

#[test]
fn trailing_dot_and_space_match_unprefixed_lookup() {
    let n = windows_at(r"C:\cwd");
    assert_eq!(n.normalize_str(r"C:\dir.\file "), r"\\?\C:\dir\file");
    assert_eq!(n.normalize_str(r"\\srv\share\report. "), r"\\?\UNC\srv\share\report");
    let once = n.normalize_str(r"C:\x..\y  ");
    assert_eq!(once, r"\\?\C:\x\y");
    assert_eq!(n.normalize_str(&once), once);
}

#[test]
fn other_drive_relative_is_left_alone() {
    let n = windows_at(r"C:\cwd");
    assert_eq!(n.normalize_str("Z:notes.txt"), "Z:notes.txt");
}

#[test]
fn when_long_policy_threshold() {
    let n = windows_at(r"C:\cwd").with_policy(PrefixPolicy::WhenLong);
    let short = r"C:\short\path.txt";
    assert_eq!(n.normalize_str(short), short);

    let long = format!(r"C:\{}", "d".repeat(LEGACY_MAX_PATH));
    assert!(n.normalize_str(&long).starts_with(r"\\?\"));
}

#[test]
fn unrestricted_host_is_identity_through_trait() {
    let n = LongPathNormalizer::new().with_capability(Capability::Unrestricted);
    for p in ["relative/dir", "/abs/unix/path", r"C:\win"] {
        assert_eq!(n.normalize(Path::new(p)), Path::new(p));
    }
}

#[cfg(not(windows))]
#[test]
fn host_default_is_identity_off_windows() {
    let p = Path::new("some/relative/../path");
    assert_eq!(long_path_fs::normalize(p), p);
    assert_eq!(long_path_fs::simplify(p), p);
}

#[cfg(windows)]
#[test]
fn host_default_prefixes_on_windows() {
    let out = long_path_fs::normalize(r"C:\Windows");
    assert_eq!(out, Path::new(r"\\?\C:\Windows"));
    assert_eq!(long_path_fs::simplify(&out), Path::new(r"C:\Windows"));
}
