//! Streaming copy.
//!
//! Buffered reader/writer pair with a platform-sized buffer. The source is read
//! once from its current position to EOF; growth during the copy is not picked
//! up.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Default chunk size: 1 MiB on Windows, 64 KiB elsewhere.
pub const COPY_BUFSIZE: usize = if cfg!(windows) { 1024 * 1024 } else { 64 * 1024 };

/// Copy everything readable from `src` into `dst` in chunks of `length`
/// bytes (`0` picks [`COPY_BUFSIZE`]). Returns the number of bytes copied.
pub fn copyfileobj<R, W>(src: &mut R, dst: &mut W, length: usize) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let len = if length == 0 { COPY_BUFSIZE } else { length };
    let mut buf = vec![0u8; len];
    let mut total: u64 = 0;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }
    Ok(total)
}

/// Copy file contents `src` -> `dst`, creating or truncating `dst`.
pub(super) fn copy_contents(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dst)?;

    let mut reader = BufReader::with_capacity(COPY_BUFSIZE, src_f);
    let mut writer = BufWriter::with_capacity(COPY_BUFSIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    Ok(bytes)
}
