//! # Readers
//!
//! A reader turns a source into a one-shot sequence of [`Member`]s, all
//! directories first. Every variant is an `Iterator<Item = Result<Member>>`;
//! iterating again needs a fresh reader.

pub mod directory;
pub mod vimball;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::common::{Member, PermDefaults};
use crate::error::{ConvertError, Result};
use crate::format::Format;

pub use directory::DirectoryReader;
pub use vimball::VimballReader;

/// Any of the supported source formats.
pub enum Reader {
    Directory(DirectoryReader),
    Vimball(VimballReader<BufReader<File>>),
    VimballGz(VimballReader<BufReader<MultiGzDecoder<File>>>),
}

impl Reader {
    /// Opens `path` as the given format.
    pub fn open(format: Format, path: &Path, defaults: PermDefaults) -> Result<Self> {
        let reader = match format {
            Format::Dir => Reader::Directory(DirectoryReader::open(path, defaults)?),
            Format::Vimball => Reader::Vimball(VimballReader::open(path, defaults)?),
            Format::VimballGz => Reader::VimballGz(VimballReader::open_gz(path, defaults)?),
            Format::Zip => {
                return Err(ConvertError::unsupported(format!("'{}' cannot be used as a source", format)))
            }
        };
        Ok(reader)
    }

    /// Detects the format of `path` and opens it.
    pub fn detect(path: &Path, defaults: PermDefaults) -> Result<Self> {
        Self::open(Format::detect(path)?, path, defaults)
    }

    pub fn format(&self) -> Format {
        match self {
            Reader::Directory(_) => Format::Dir,
            Reader::Vimball(_) => Format::Vimball,
            Reader::VimballGz(_) => Format::VimballGz,
        }
    }
}

impl Iterator for Reader {
    type Item = Result<Member>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Reader::Directory(r) => r.next(),
            Reader::Vimball(r) => r.next(),
            Reader::VimballGz(r) => r.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_is_not_a_source() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let err = Reader::open(Format::Zip, dir.path(), PermDefaults::default()).err();
        assert!(matches!(err, Some(ConvertError::UnsupportedFormat { .. })));
        Ok(())
    }

    #[test]
    fn detect_opens_matching_variant() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let reader = Reader::detect(dir.path(), PermDefaults::default())?;
        assert_eq!(reader.format(), Format::Dir);

        let vba = dir.path().join("x.vba");
        std::fs::write(&vba, "UseVimball\nfinish\nf\t[[[1\n1\nx\n")?;
        let reader = Reader::detect(&vba, PermDefaults::default())?;
        assert_eq!(reader.format(), Format::Vimball);
        assert_eq!(reader.count(), 1);
        Ok(())
    }

    #[test]
    fn missing_source_is_a_construction_error() {
        let err = Reader::open(Format::Vimball, Path::new("/nonexistent/x.vba"), PermDefaults::default()).err();
        assert!(matches!(err, Some(ConvertError::Construction { .. })));
    }
}
