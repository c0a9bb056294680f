//! # Writers
//!
//! A writer consumes [`Member`]s one at a time and materializes them in a
//! destination. Formats that cannot represent empty directories (Vimball,
//! zip) silently skip directory members.

pub mod directory;
pub mod vimball;
pub mod zip_archive;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;

use crate::common::Member;
use crate::error::{ConvertError, Result};
use crate::format::Format;

pub use directory::DirectoryWriter;
pub use vimball::VimballWriter;
pub use zip_archive::ZipArchiveWriter;

/// Something members can be added to, in order.
pub trait ArchiveWrite {
    fn add(&mut self, member: Member) -> Result<()>;
}

impl<W: ArchiveWrite + ?Sized> ArchiveWrite for &mut W {
    fn add(&mut self, member: Member) -> Result<()> {
        (**self).add(member)
    }
}

/// Any of the supported destination formats.
pub enum Writer {
    Directory(DirectoryWriter),
    Vimball(VimballWriter<BufWriter<File>>),
    VimballGz(VimballWriter<GzEncoder<BufWriter<File>>>),
    Zip(ZipArchiveWriter),
}

impl Writer {
    /// Prepares `path` as a destination of the given format.
    pub fn create(format: Format, path: &Path) -> Result<Self> {
        let writer = match format {
            Format::Dir => Writer::Directory(DirectoryWriter::create(path)?),
            Format::Vimball => Writer::Vimball(VimballWriter::create(path)?),
            Format::VimballGz => Writer::VimballGz(VimballWriter::create_gz(path)?),
            Format::Zip => Writer::Zip(ZipArchiveWriter::create(path)?),
        };
        Ok(writer)
    }

    pub fn format(&self) -> Format {
        match self {
            Writer::Directory(_) => Format::Dir,
            Writer::Vimball(_) => Format::Vimball,
            Writer::VimballGz(_) => Format::VimballGz,
            Writer::Zip(_) => Format::Zip,
        }
    }

    /// Flushes buffers and writes any trailer (gzip footer, zip central directory).
    ///
    /// Dropping a writer without calling this still closes the destination,
    /// but errors from the final write are lost.
    pub fn finish(self) -> Result<()> {
        match self {
            Writer::Directory(_) => Ok(()),
            Writer::Vimball(w) => {
                let path = w.path().to_path_buf();
                w.into_inner().flush().map_err(|e| ConvertError::io(&path, e))
            }
            Writer::VimballGz(w) => {
                let path = w.path().to_path_buf();
                let mut out = w.into_inner().finish().map_err(|e| ConvertError::io(&path, e))?;
                out.flush().map_err(|e| ConvertError::io(&path, e))
            }
            Writer::Zip(w) => w.finish(),
        }
    }
}

impl ArchiveWrite for Writer {
    fn add(&mut self, member: Member) -> Result<()> {
        match self {
            Writer::Directory(w) => w.add(member),
            Writer::Vimball(w) => w.add(member),
            Writer::VimballGz(w) => w.add(member),
            Writer::Zip(w) => w.add(member),
        }
    }
}

/// Refuses names that are empty, absolute or climb out with `..`.
pub(crate) fn check_name(name: &str) -> Result<()> {
    let unsafe_name = name.is_empty()
        || name.starts_with('/')
        || name.starts_with('\\')
        || name.split(['/', '\\']).any(|part| part == "..")
        || Path::new(name).has_root();
    if unsafe_name {
        return Err(ConvertError::UnsafeName { name: name.to_owned() });
    }
    Ok(())
}
