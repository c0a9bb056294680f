//! Common types shared by every reader and writer.
//!
//! [`Member`] is the unit of exchange: readers produce them, writers consume
//! them. [`PermDefaults`] carries the process-wide default permissions that
//! members start from when their source has no permission metadata.

use chrono::{Local, NaiveDateTime, Timelike};
use std::time::SystemTime;

use crate::fsx;

/// Directory type bit of a member's permissions.
pub const DIR_BIT: u32 = fsx::S_IFDIR;
/// Execute bits toggled together with [`DIR_BIT`].
pub const EXEC_BITS: u32 = 0o111;

const DEFAULT_MODE: u32 = 0o666;
const FALLBACK_UMASK: u32 = 0o022;

/// Default permissions for newly constructed members.
///
/// Computed once per process and handed to every reader; nothing in the crate
/// changes the process umask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermDefaults {
    umask: u32,
}

impl PermDefaults {
    pub fn with_umask(umask: u32) -> Self {
        Self { umask: umask & 0o777 }
    }

    /// Queries the current process umask, falling back to `022` where it cannot be read.
    pub fn from_process() -> Self {
        match fsx::query_umask() {
            Some(umask) => {
                tracing::debug!(umask = format_args!("{:03o}", umask), "read process umask");
                Self::with_umask(umask)
            }
            None => {
                tracing::debug!("process umask unavailable, assuming 022");
                Self::with_umask(FALLBACK_UMASK)
            }
        }
    }

    pub fn umask(&self) -> u32 {
        self.umask
    }

    /// `0666` with the umask bits removed.
    pub fn file_mode(&self) -> u32 {
        DEFAULT_MODE & !self.umask
    }
}

impl Default for PermDefaults {
    fn default() -> Self {
        Self::with_umask(FALLBACK_UMASK)
    }
}

/// One archived entry: a file with its content or a directory.
///
/// The directory flag lives in `perm`. [`Member::set_dir`] flips it and keeps
/// the execute bits in step; [`Member::set_perm`] stores a mode verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    name: String,
    data: Option<Vec<u8>>,
    mtime: NaiveDateTime,
    perm: u32,
}

impl Member {
    /// A file member with empty content, default permissions and the current local time.
    pub fn new(name: impl Into<String>, defaults: &PermDefaults) -> Self {
        Self {
            name: name.into(),
            data: Some(Vec::new()),
            mtime: truncate_to_seconds(Local::now().naive_local()),
            perm: defaults.file_mode(),
        }
    }

    pub fn file(name: impl Into<String>, data: Vec<u8>, defaults: &PermDefaults) -> Self {
        let mut member = Self::new(name, defaults);
        member.data = Some(data);
        member
    }

    pub fn directory(name: impl Into<String>, defaults: &PermDefaults) -> Self {
        let mut member = Self::new(name, defaults);
        member.set_dir(true);
        member
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content of a file member; `None` for directories.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn into_data(self) -> Option<Vec<u8>> {
        self.data
    }

    /// Replaces the content. A directory member becomes a file.
    pub fn set_data(&mut self, data: Vec<u8>) {
        if self.is_dir() {
            self.set_dir(false);
        }
        self.data = Some(data);
    }

    pub fn mtime(&self) -> NaiveDateTime {
        self.mtime
    }

    pub fn set_mtime(&mut self, mtime: NaiveDateTime) {
        self.mtime = truncate_to_seconds(mtime);
    }

    /// Sets the modification time from a filesystem timestamp, in local time.
    pub fn set_mtime_from_system(&mut self, time: SystemTime) {
        let local: chrono::DateTime<Local> = time.into();
        self.set_mtime(local.naive_local());
    }

    pub fn perm(&self) -> u32 {
        self.perm
    }

    /// Stores `perm` as is, type bits included. Only the content is adjusted
    /// so that directories carry none and files carry some.
    pub fn set_perm(&mut self, perm: u32) {
        self.perm = perm;
        if self.is_dir() {
            self.data = None;
        } else if self.data.is_none() {
            self.data = Some(Vec::new());
        }
    }

    pub fn is_dir(&self) -> bool {
        self.perm & DIR_BIT == DIR_BIT
    }

    /// Flips directory status. Turning a member into a directory also sets the
    /// three execute bits and drops its content; turning it back clears them.
    pub fn set_dir(&mut self, is_dir: bool) {
        if is_dir {
            self.perm |= DIR_BIT | EXEC_BITS;
            self.data = None;
        } else {
            self.perm &= !(DIR_BIT | EXEC_BITS);
            if self.data.is_none() {
                self.data = Some(Vec::new());
            }
        }
    }
}

fn truncate_to_seconds(time: NaiveDateTime) -> NaiveDateTime {
    time.with_nanosecond(0).unwrap_or(time)
}
