//! Which arguments of each operation are paths.
//!
//! The forwarder consults this table instead of hard-coding the knowledge in
//! each wrapper; adding an operation means adding one row.

/// Every operation the forwarder exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CopyFileObj,
    CopyFile,
    CopyMode,
    CopyStat,
    Copy,
    Copy2,
    CopyTree,
    Move,
    RmTree,
    DiskUsage,
    Chown,
    Which,
    IgnorePatterns,
    GetArchiveFormats,
    RegisterArchiveFormat,
    UnregisterArchiveFormat,
    GetUnpackFormats,
    RegisterUnpackFormat,
    UnregisterUnpackFormat,
    MakeArchive,
    UnpackArchive,
}

impl Operation {
    pub const ALL: [Operation; 21] = [
        Operation::CopyFileObj,
        Operation::CopyFile,
        Operation::CopyMode,
        Operation::CopyStat,
        Operation::Copy,
        Operation::Copy2,
        Operation::CopyTree,
        Operation::Move,
        Operation::RmTree,
        Operation::DiskUsage,
        Operation::Chown,
        Operation::Which,
        Operation::IgnorePatterns,
        Operation::GetArchiveFormats,
        Operation::RegisterArchiveFormat,
        Operation::UnregisterArchiveFormat,
        Operation::GetUnpackFormats,
        Operation::RegisterUnpackFormat,
        Operation::UnregisterUnpackFormat,
        Operation::MakeArchive,
        Operation::UnpackArchive,
    ];
}

/// Role of a path-valued argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathArg {
    Src,
    Dst,
    Path,
    BaseName,
    RootDir,
    Filename,
    ExtractDir,
}

#[derive(Debug)]
pub struct OperationSpec {
    pub name: &'static str,
    pub op: Operation,
    /// Path arguments always present, in call order.
    pub required: &'static [PathArg],
    /// Path arguments normalized only when supplied.
    pub optional: &'static [PathArg],
}

const fn row(
    name: &'static str,
    op: Operation,
    required: &'static [PathArg],
    optional: &'static [PathArg],
) -> OperationSpec {
    OperationSpec {
        name,
        op,
        required,
        optional,
    }
}

const SRC_DST: &[PathArg] = &[PathArg::Src, PathArg::Dst];
const NONE: &[PathArg] = &[];

pub static OPERATIONS: &[OperationSpec] = &[
    row("copyfileobj", Operation::CopyFileObj, NONE, NONE),
    row("copyfile", Operation::CopyFile, SRC_DST, NONE),
    row("copymode", Operation::CopyMode, SRC_DST, NONE),
    row("copystat", Operation::CopyStat, SRC_DST, NONE),
    row("copy", Operation::Copy, SRC_DST, NONE),
    row("copy2", Operation::Copy2, SRC_DST, NONE),
    row("copytree", Operation::CopyTree, SRC_DST, NONE),
    row("move", Operation::Move, SRC_DST, NONE),
    row("rmtree", Operation::RmTree, &[PathArg::Path], NONE),
    row("disk_usage", Operation::DiskUsage, &[PathArg::Path], NONE),
    row("chown", Operation::Chown, &[PathArg::Path], NONE),
    // the search list is a PATH-style string, not a path
    row("which", Operation::Which, NONE, NONE),
    row("ignore_patterns", Operation::IgnorePatterns, NONE, NONE),
    row("get_archive_formats", Operation::GetArchiveFormats, NONE, NONE),
    row("register_archive_format", Operation::RegisterArchiveFormat, NONE, NONE),
    row("unregister_archive_format", Operation::UnregisterArchiveFormat, NONE, NONE),
    row("get_unpack_formats", Operation::GetUnpackFormats, NONE, NONE),
    row("register_unpack_format", Operation::RegisterUnpackFormat, NONE, NONE),
    row("unregister_unpack_format", Operation::UnregisterUnpackFormat, NONE, NONE),
    // base_dir names members inside the archive and stays relative to root_dir
    row("make_archive", Operation::MakeArchive, &[PathArg::BaseName], &[PathArg::RootDir]),
    row("unpack_archive", Operation::UnpackArchive, &[PathArg::Filename], &[PathArg::ExtractDir]),
];

/// Table row for `op`.
pub fn spec(op: Operation) -> &'static OperationSpec {
    OPERATIONS
        .iter()
        .find(|s| s.op == op)
        .unwrap_or_else(|| unreachable!("operation {op:?} missing from OPERATIONS"))
}
