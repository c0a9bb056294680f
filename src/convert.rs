//! # Conversion Driver
//!
//! Pulls members from a reader and pushes them into a writer, one at a time,
//! in reader order. The first error from either side aborts the conversion;
//! whatever was already written stays in place.

use std::path::{Path, PathBuf};

use crate::common::{Member, PermDefaults};
use crate::error::{ConvertError, Result};
use crate::format::{self, Format};
use crate::reader::Reader;
use crate::writer::{ArchiveWrite, Writer};

/// Counts of what went through [`convert`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvertStats {
    pub directories: usize,
    pub files: usize,
}

/// Feeds every member of `reader` to `writer`.
pub fn convert<R, W>(reader: R, writer: &mut W) -> Result<ConvertStats>
where
    R: IntoIterator<Item = Result<Member>>,
    W: ArchiveWrite + ?Sized,
{
    let mut stats = ConvertStats::default();
    for member in reader {
        let member = member?;
        if member.is_dir() {
            stats.directories += 1;
        } else {
            stats.files += 1;
        }
        writer.add(member)?;
    }
    Ok(stats)
}

/// Converts the archive or directory at `source` into `to`.
///
/// `from` forces the source format; without it the format is detected.
/// Without an explicit `destination` the name is derived from the source
/// (see [`format::default_destination`]). Returns the destination path.
pub fn convert_path(
    source: &Path,
    destination: Option<&Path>,
    from: Option<Format>,
    to: Format,
    defaults: PermDefaults,
) -> Result<PathBuf> {
    let from = match from {
        Some(format) => format,
        None => Format::detect(source)?,
    };
    let destination = match destination {
        Some(path) if format::same_path(path, source) => {
            return Err(ConvertError::Argument(format!(
                "source and destination are the same path '{}'",
                path.display()
            )));
        }
        Some(path) => path.to_path_buf(),
        None => format::default_destination(source, from, to),
    };

    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        "converting {} to {}",
        from,
        to
    );

    let reader = Reader::open(from, source, defaults)?;
    let mut writer = Writer::create(to, &destination)?;
    let stats = convert(reader, &mut writer)?;
    writer.finish()?;

    tracing::info!(directories = stats.directories, files = stats.files, "conversion finished");
    Ok(destination)
}
