//! # Vimball Writer
//!
//! Serializes members into the Vimball text format understood by Vim's
//! `:source`/`:UseVimball`. Directories have no representation and are skipped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

use super::{check_name, ArchiveWrite};
use crate::common::Member;
use crate::error::{ConvertError, Result};
use crate::reader::vimball::FILE_MARKER;

/// Written before the first member.
pub const HEADER: &[u8] = b"\" Vimball Archiver by Charles E. Campbell\nUseVimball\nfinish\n";

pub struct VimballWriter<W: Write> {
    out: W,
    path: PathBuf,
    header_written: bool,
}

impl VimballWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = create_destination(path)?;
        Ok(Self::new(BufWriter::new(file), path))
    }
}

impl VimballWriter<GzEncoder<BufWriter<File>>> {
    pub fn create_gz(path: &Path) -> Result<Self> {
        let file = create_destination(path)?;
        let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        Ok(Self::new(encoder, path))
    }
}

impl<W: Write> VimballWriter<W> {
    /// Wraps an open sink. `path` is only used in error messages.
    pub fn new(out: W, path: impl Into<PathBuf>) -> Self {
        Self { out, path: path.into(), header_written: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the sink without flushing it.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_member(&mut self, name: &str, data: &[u8]) -> std::io::Result<()> {
        let missing_newline = !data.ends_with(b"\n");
        let count = data.iter().filter(|&&b| b == b'\n').count() + usize::from(missing_newline);

        self.out.write_all(name.as_bytes())?;
        self.out.write_all(FILE_MARKER)?;
        writeln!(self.out, "{}", count)?;
        self.out.write_all(data)?;
        if missing_newline {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl<W: Write> ArchiveWrite for VimballWriter<W> {
    fn add(&mut self, member: Member) -> Result<()> {
        if !self.header_written {
            self.out.write_all(HEADER).map_err(|e| ConvertError::io(&self.path, e))?;
            self.header_written = true;
        }
        if member.is_dir() {
            tracing::debug!(name = member.name(), "Vimball has no directories, skipping");
            return Ok(());
        }
        check_name(member.name())?;
        if member.name().contains('\n') {
            return Err(ConvertError::UnsafeName { name: member.name().to_owned() });
        }

        tracing::debug!(name = member.name(), "adding to Vimball");
        let data = member.data().unwrap_or_default();
        self.write_member(member.name(), data).map_err(|e| ConvertError::io(&self.path, e))
    }
}

fn create_destination(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| ConvertError::Construction {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PermDefaults;

    fn render(members: Vec<Member>) -> Result<Vec<u8>> {
        let mut writer = VimballWriter::new(Vec::new(), "mem.vba");
        for member in members {
            writer.add(member)?;
        }
        Ok(writer.into_inner())
    }

    #[test]
    fn single_file_layout() -> Result<()> {
        let defaults = PermDefaults::default();
        let out = render(vec![
            Member::directory("a", &defaults),
            Member::file("a/b.txt", b"hi".to_vec(), &defaults),
        ])?;
        let mut expected = HEADER.to_vec();
        expected.extend_from_slice(b"a/b.txt\t[[[1\n1\nhi\n");
        assert_eq!(out, expected);
        Ok(())
    }

    #[test]
    fn counts_lines_of_terminated_content() -> Result<()> {
        let defaults = PermDefaults::default();
        let member = Member::file("x.vim", b"one\ntwo\n\n".to_vec(), &defaults);
        let out = render(vec![member.clone()])?;
        assert!(out.ends_with(b"x.vim\t[[[1\n3\none\ntwo\n\n"));
        assert_eq!(member.data(), Some(&b"one\ntwo\n\n"[..]));
        Ok(())
    }

    #[test]
    fn empty_content_becomes_one_blank_line() -> Result<()> {
        let out = render(vec![Member::file("e", Vec::new(), &PermDefaults::default())])?;
        assert!(out.ends_with(b"e\t[[[1\n1\n\n"));
        Ok(())
    }

    #[test]
    fn header_is_written_once_even_for_directories() -> Result<()> {
        let defaults = PermDefaults::default();
        assert_eq!(render(vec![Member::directory("only", &defaults)])?, HEADER);
        assert!(render(Vec::new())?.is_empty());

        let out = render(vec![
            Member::file("a", b"1\n".to_vec(), &defaults),
            Member::file("b", b"2\n".to_vec(), &defaults),
        ])?;
        assert_eq!(out.windows(b"UseVimball".len()).filter(|w| *w == b"UseVimball").count(), 1);
        Ok(())
    }

    #[test]
    fn output_parses_back() -> Result<()> {
        use crate::reader::VimballReader;

        let defaults = PermDefaults::default();
        let out = render(vec![
            Member::file("doc/help.txt", b"no trailing newline".to_vec(), &defaults),
            Member::file("plugin/p.vim", b"let x = 1\n".to_vec(), &defaults),
        ])?;
        let members: Vec<Member> = VimballReader::new(std::io::Cursor::new(out), "mem.vba", defaults).collect::<Result<_>>()?;
        let files: Vec<(&str, Option<&[u8]>)> =
            members.iter().filter(|m| !m.is_dir()).map(|m| (m.name(), m.data())).collect();
        assert_eq!(
            files,
            vec![
                ("doc/help.txt", Some(&b"no trailing newline\n"[..])),
                ("plugin/p.vim", Some(&b"let x = 1\n"[..])),
            ]
        );
        Ok(())
    }

    #[test]
    fn refuses_unsafe_names() {
        let err = render(vec![Member::file("../evil", b"x\n".to_vec(), &PermDefaults::default())]).unwrap_err();
        assert!(matches!(err, ConvertError::UnsafeName { .. }));
    }
}
