//! Real long paths on a Windows host.
#![cfg(windows)]

use long_path_fs::{CopyTreeOptions, LongPathFs, RmTreeOptions, LEGACY_MAX_PATH};
use std::fs;
use std::path::PathBuf;

fn deep_dir(base: &std::path::Path) -> PathBuf {
    let mut p = base.to_path_buf();
    while p.as_os_str().len() <= LEGACY_MAX_PATH + 20 {
        p.push("a_fairly_long_directory_segment");
    }
    p
}

#[test]
fn copy_and_remove_beyond_legacy_limit() {
    let td = tempfile::tempdir().unwrap();
    let fs_ = LongPathFs::new();
    let src = td.path().join("src.txt");
    fs::write(&src, b"long").unwrap();

    let deep = deep_dir(td.path());
    fs::create_dir_all(long_path_fs::normalize(&deep)).unwrap();
    let dst = deep.join("copy.txt");
    fs_.copy2(&src, &dst, true).unwrap();
    assert_eq!(fs::read(long_path_fs::normalize(&dst)).unwrap(), b"long");

    let mirror = td.path().join("mirror");
    fs_.copytree(td.path().join("a_fairly_long_directory_segment"), &mirror, &CopyTreeOptions::default())
        .unwrap();

    fs_.rmtree(td.path().join("a_fairly_long_directory_segment"), &RmTreeOptions::default())
        .unwrap();
    fs_.rmtree(&mirror, &RmTreeOptions::default()).unwrap();
    assert!(!long_path_fs::normalize(&deep).exists());
}
