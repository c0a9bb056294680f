//! Writes members into a zip archive through the `zip` crate.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime, Timelike};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::{check_name, ArchiveWrite};
use crate::common::Member;
use crate::error::{ConvertError, Result};

/// Deflate-compressed zip output. Each entry carries the member's
/// modification time and its permission bits in the external attributes.
///
/// Directory members are skipped: empty directories are not recorded.
/// `zip` 0.6 keeps only `mode & 0o777`, so setuid, setgid and sticky bits
/// are lost.
pub struct ZipArchiveWriter {
    zip: ZipWriter<BufWriter<File>>,
    path: PathBuf,
}

impl ZipArchiveWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| ConvertError::Construction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self { zip: ZipWriter::new(BufWriter::new(file)), path: path.to_path_buf() })
    }

    /// Writes the central directory and flushes the file.
    pub fn finish(mut self) -> Result<()> {
        let mut out = self.zip.finish()?;
        out.flush().map_err(|e| ConvertError::io(&self.path, e))
    }
}

impl ArchiveWrite for ZipArchiveWriter {
    fn add(&mut self, member: Member) -> Result<()> {
        if member.is_dir() {
            // TODO: record empty directories as `name/` entries via add_directory.
            tracing::debug!(name = member.name(), "skipping directory member");
            return Ok(());
        }
        check_name(member.name())?;

        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip_time(member.mtime()))
            .unix_permissions(member.perm());
        tracing::debug!(name = member.name(), mode = format_args!("{:o}", member.perm()), "adding to zip");

        self.zip.start_file(member.name(), options)?;
        let data = member.data().unwrap_or_default();
        self.zip.write_all(data).map_err(|e| ConvertError::io(&self.path, e))
    }
}

/// Zip timestamps cover 1980..=2107; anything outside is clamped to the epoch.
fn zip_time(mtime: NaiveDateTime) -> DateTime {
    let converted = u16::try_from(mtime.year()).ok().and_then(|year| {
        DateTime::from_date_and_time(
            year,
            mtime.month() as u8,
            mtime.day() as u8,
            mtime.hour() as u8,
            mtime.minute() as u8,
            mtime.second() as u8,
        )
        .ok()
    });
    converted.unwrap_or_else(|| {
        tracing::warn!(%mtime, "timestamp not representable in zip, using 1980-01-01");
        DateTime::default()
    })
}
