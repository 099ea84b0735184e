//! Lexical Windows path handling.
//!
//! Works on plain `&str` so the same rules apply whatever the host OS is.
//! Nothing here touches the filesystem.

use std::borrow::Cow;

/// Local-drive verbatim prefix.
pub const VERBATIM_PREFIX: &str = r"\\?\";
/// UNC verbatim prefix.
pub const VERBATIM_UNC_PREFIX: &str = r"\\?\UNC\";

#[inline]
pub(crate) fn is_sep(c: char) -> bool {
    c == '\\' || c == '/'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Root<'a> {
    Drive(char),
    Unc { server: &'a str, share: &'a str },
}

/// Syntactic shape of a path string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shape<'a> {
    /// `\\?\`, `\\.\`, `\??\` and their slash spellings. Never rewritten.
    Namespaced,
    /// `C:\x` or `\\server\share\x`.
    Absolute { root: Root<'a>, rest: &'a str },
    /// `C:x`: relative to the current directory of drive `C`.
    DriveRelative { drive: char, rest: &'a str },
    /// `\x`: relative to the root of the current drive or share.
    RootRelative(&'a str),
    /// `x\y`
    Relative(&'a str),
    /// Starts like UNC but has no share component.
    Unrecognized,
}

pub(crate) fn classify(s: &str) -> Shape<'_> {
    let mut chars = s.chars();
    let lead: [Option<char>; 4] = [chars.next(), chars.next(), chars.next(), chars.next()];

    // \\?\  \\.\  //?/  //./
    if let [Some(a), Some(b), Some(c), Some(d)] = lead {
        if is_sep(a) && is_sep(b) && (c == '?' || c == '.') && is_sep(d) {
            return Shape::Namespaced;
        }
        // \??\
        if a == '\\' && b == '?' && c == '?' && d == '\\' {
            return Shape::Namespaced;
        }
    }

    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        let drive = bytes[0] as char;
        let rest = &s[2..];
        return if rest.starts_with(is_sep) {
            Shape::Absolute {
                root: Root::Drive(drive),
                rest,
            }
        } else {
            Shape::DriveRelative { drive, rest }
        };
    }

    match (lead[0], lead[1]) {
        (Some(a), Some(b)) if is_sep(a) && is_sep(b) => split_unc(s),
        (Some(a), _) if is_sep(a) => Shape::RootRelative(s),
        _ => Shape::Relative(s),
    }
}

fn split_unc(s: &str) -> Shape<'_> {
    let body = s.trim_start_matches(is_sep);
    let Some(server_end) = body.find(is_sep) else {
        return Shape::Unrecognized;
    };
    let server = &body[..server_end];
    let after = body[server_end..].trim_start_matches(is_sep);
    let share_end = after.find(is_sep).unwrap_or(after.len());
    let share = &after[..share_end];
    if server.is_empty() || share.is_empty() {
        return Shape::Unrecognized;
    }
    Shape::Absolute {
        root: Root::Unc { server, share },
        rest: &after[share_end..],
    }
}

/// Strip a verbatim prefix so a working directory reported in that form can
/// still act as a base for relative paths.
pub(crate) fn strip_verbatim(s: &str) -> Cow<'_, str> {
    if let Some(rest) = s.strip_prefix(VERBATIM_UNC_PREFIX) {
        return Cow::Owned(format!(r"\\{rest}"));
    }
    match s.strip_prefix(VERBATIM_PREFIX) {
        Some(rest) if matches!(classify(rest), Shape::Absolute { .. }) => Cow::Borrowed(rest),
        _ => Cow::Borrowed(s),
    }
}

fn push_segments<'a>(stack: &mut Vec<&'a str>, rest: &'a str) {
    for seg in rest.split(is_sep) {
        match seg {
            "" | "." => {}
            ".." => {
                // never climbs above the root
                stack.pop();
            }
            s => {
                // Win32 drops trailing dots and spaces; a verbatim path would keep them
                let trimmed = s.trim_end_matches(['.', ' ']);
                if !trimmed.is_empty() {
                    stack.push(trimmed);
                }
            }
        }
    }
}

/// Absolute path with `.`/`..` resolved and separators canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved<'a> {
    root: Root<'a>,
    segments: Vec<&'a str>,
}

impl Resolved<'_> {
    /// Conventional form: `C:\a\b` or `\\server\share\a`.
    pub(crate) fn render(&self) -> String {
        let mut out = match &self.root {
            Root::Drive(d) => format!("{d}:\\"),
            Root::Unc { server, share } => format!(r"\\{server}\{share}"),
        };
        if !self.segments.is_empty() {
            if matches!(self.root, Root::Unc { .. }) {
                out.push('\\');
            }
            out.push_str(&self.segments.join("\\"));
        }
        out
    }

    /// Escape-prefixed form: `\\?\C:\a\b` or `\\?\UNC\server\share\a`.
    pub(crate) fn to_verbatim(&self) -> String {
        let plain = self.render();
        match self.root {
            Root::Drive(_) => format!("{VERBATIM_PREFIX}{plain}"),
            // drop the leading `\\` of the UNC form
            Root::Unc { .. } => format!("{VERBATIM_UNC_PREFIX}{}", &plain[2..]),
        }
    }
}

/// Turn `input` into an absolute path against `cwd` (already stripped of any
/// verbatim prefix). `None` means "leave the input alone".
pub(crate) fn absolutize<'a>(
    input: &'a str,
    cwd: Option<&'a str>,
) -> Option<Resolved<'a>> {
    let base = || match cwd.map(classify) {
        Some(Shape::Absolute { root, rest }) => Some((root, rest)),
        _ => None,
    };

    let mut segments = Vec::new();
    let root = match classify(input) {
        Shape::Absolute { root, rest } => {
            push_segments(&mut segments, rest);
            root
        }
        Shape::Relative(rest) => {
            let (root, base_rest) = base()?;
            push_segments(&mut segments, base_rest);
            push_segments(&mut segments, rest);
            root
        }
        Shape::RootRelative(rest) => {
            let (root, _) = base()?;
            push_segments(&mut segments, rest);
            root
        }
        Shape::DriveRelative { drive, rest } => match base()? {
            (Root::Drive(d), base_rest) if d.eq_ignore_ascii_case(&drive) => {
                push_segments(&mut segments, base_rest);
                push_segments(&mut segments, rest);
                Root::Drive(drive)
            }
            _ => return None,
        },
        Shape::Namespaced | Shape::Unrecognized => return None,
    };
    Some(Resolved { root, segments })
}

/// Whether the input needs a working directory to become absolute.
pub(crate) fn needs_base(input: &str) -> bool {
    matches!(
        classify(input),
        Shape::Relative(_) | Shape::RootRelative(_) | Shape::DriveRelative { .. }
    )
}
