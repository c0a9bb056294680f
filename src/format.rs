//! Format identifiers, source auto-detection and destination naming.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use clap::ValueEnum;

use crate::error::{ConvertError, Result};
use crate::reader::{directory, vimball};

/// Every container this crate can convert between.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// A plain directory tree.
    Dir,
    /// A Vimball text archive.
    #[value(name = "vba")]
    Vimball,
    /// A gzip-compressed Vimball.
    #[value(name = "vba.gz")]
    VimballGz,
    /// A zip archive (output only).
    Zip,
}

impl Format {
    /// All formats that can be written, in listing order.
    pub const ALL: [Format; 4] = [Format::Dir, Format::Vimball, Format::VimballGz, Format::Zip];

    /// Formats that can be read, in detection priority order.
    pub const READABLE: [Format; 3] = [Format::Dir, Format::Vimball, Format::VimballGz];

    /// Identifier used on the command line and in program names.
    pub fn tag(self) -> &'static str {
        match self {
            Format::Dir => "dir",
            Format::Vimball => "vba",
            Format::VimballGz => "vba.gz",
            Format::Zip => "zip",
        }
    }

    /// File name suffix, empty for directories.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Dir => "",
            Format::Vimball => ".vba",
            Format::VimballGz => ".vba.gz",
            Format::Zip => ".zip",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Format> {
        Format::ALL.into_iter().find(|f| f.tag().eq_ignore_ascii_case(tag))
    }

    /// Cheap, non-destructive check whether `path` can be read as this format.
    pub fn probe(self, path: &Path) -> bool {
        match self {
            Format::Dir => directory::is_supported(path),
            Format::Vimball => vimball::is_supported(path),
            Format::VimballGz => vimball::is_supported_gz(path),
            Format::Zip => false,
        }
    }

    /// Picks the first readable format whose probe accepts `path`.
    pub fn detect(path: &Path) -> Result<Format> {
        let format = Format::READABLE
            .into_iter()
            .find(|f| f.probe(path))
            .ok_or_else(|| ConvertError::unsupported(format!("no reader accepts '{}'", path.display())))?;
        tracing::debug!(path = %path.display(), format = %format, "detected source format");
        Ok(format)
    }
}

/// Source and destination formats selected by a `<src>2<dst>` name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mode {
    /// `None` leaves the source format to detection.
    pub from: Option<Format>,
    pub to: Format,
}

impl Mode {
    /// Parses a mode such as `vba2zip` or `dir2vba.gz`.
    ///
    /// A bare `<dst>` (no `2`) leaves the source to detection. Either half
    /// naming an unknown format is an error.
    pub fn parse(name: &str) -> Result<Mode> {
        split_mode(name).map_err(ConvertError::unsupported)
    }

    /// Mode implied by the program name, lower-cased and stripped of `.exe`,
    /// so a binary called `vba2zip` reads Vimball and writes zip.
    pub fn from_program_name(name: &str) -> Result<Mode> {
        let name = name.to_ascii_lowercase();
        let name = name.strip_suffix(".exe").unwrap_or(&name);
        split_mode(name).map_err(|reason| {
            ConvertError::unsupported(format!("program name '{}' gives {}, use --to", name, reason))
        })
    }
}

fn split_mode(name: &str) -> std::result::Result<Mode, String> {
    let lookup = |tag: &str, role: &str| Format::from_tag(tag).ok_or_else(|| format!("no such {} '{}'", role, tag));
    match name.split_once('2') {
        Some((src, dst)) => Ok(Mode { from: Some(lookup(src, "reader")?), to: lookup(dst, "writer")? }),
        None => Ok(Mode { from: None, to: lookup(name, "writer")? }),
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Default destination for converting `source` (read as `from`) into `to`.
///
/// Takes the base name of `source`, swaps the `from` extension for the `to`
/// one and, if that names the source itself, adds a `-converted` suffix.
pub fn default_destination(source: &Path, from: Format, to: Format) -> PathBuf {
    let base = base_name(source).unwrap_or_else(|| "archive".to_owned());
    let stem = strip_extension(&base, from.extension());
    let stem = if stem.is_empty() { "archive" } else { stem };

    let candidate = PathBuf::from(format!("{}{}", stem, to.extension()));
    if same_path(&candidate, source) {
        PathBuf::from(format!("{}-converted{}", stem, to.extension()))
    } else {
        candidate
    }
}

/// True if both paths resolve to the same absolute location, ignoring trailing separators.
pub fn same_path(a: &Path, b: &Path) -> bool {
    match (std::path::absolute(a), std::path::absolute(b)) {
        (Ok(a), Ok(b)) => a.components().eq(b.components()),
        _ => a.components().eq(b.components()),
    }
}

fn base_name(path: &Path) -> Option<String> {
    let last = |p: &Path| {
        p.components().rev().find_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
    };
    match path.components().next_back() {
        Some(Component::Normal(_)) => last(path),
        _ => std::path::absolute(path).ok().and_then(|abs| last(&abs)),
    }
}

fn strip_extension<'a>(name: &'a str, extension: &str) -> &'a str {
    if extension.is_empty() || name.len() <= extension.len() {
        return name;
    }
    let split = name.len() - extension.len();
    match name.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(extension) => &name[..split],
        _ => name,
    }
}
