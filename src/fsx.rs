//! Cross-platform filesystem wrapper.
//!
//! We transparently re-export std::fs and add the few mode-aware helpers the
//! directory reader and writer need. On Unix the real POSIX mode bits are used;
//! elsewhere a plausible mode is synthesized from the metadata so that members
//! still carry a consistent permission set.
//!
//! The rest of the crate imports `crate::fsx as fs` instead of touching
//! `std::fs` directly, keeping the call-sites identical across OSes.

use std::io;
use std::path::Path;

pub use std::fs::*;

/// Directory type bit of a POSIX mode.
pub const S_IFDIR: u32 = 0o40000;
/// Regular file type bit of a POSIX mode.
pub const S_IFREG: u32 = 0o100000;

#[cfg(unix)]
/// Full POSIX mode (type bits included) of the given metadata.
pub fn unix_mode(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
/// Synthesized POSIX mode: read-only files lose their write bits.
pub fn unix_mode(meta: &Metadata) -> u32 {
    let mut mode = if meta.is_dir() { S_IFDIR | 0o755 } else { S_IFREG | 0o644 };
    if meta.permissions().readonly() {
        mode &= !0o222;
    }
    mode
}

#[cfg(unix)]
/// Create a single directory with the given permission bits (still subject to umask).
pub fn create_dir_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    DirBuilder::new().mode(mode & 0o7777).create(path)
}

#[cfg(not(unix))]
/// POSIX permission bits are not applied off Unix.
pub fn create_dir_with_mode(path: &Path, _mode: u32) -> io::Result<()> {
    create_dir(path)
}

/// Reads the process file-creation mask without modifying it.
///
/// `umask(2)` can only be read by setting it, so on Linux the value is taken
/// from `/proc/self/status` instead. Returns `None` where no such source exists.
pub fn query_umask() -> Option<u32> {
    let status = read_to_string("/proc/self/status").ok()?;
    parse_status_umask(&status)
}

fn parse_status_umask(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("Umask:"))
        .and_then(|value| u32::from_str_radix(value.trim(), 8).ok())
}
