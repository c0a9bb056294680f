//! # Vimball Reader
//!
//! A Vimball is a text stream: a preamble ending in a `finish` line, then a
//! sequence of file blocks, each made of a `<name>\t[[[1` header, a decimal
//! line count and exactly that many content lines. The stream has no end
//! marker and no directory entries; directories are inferred from the file
//! names.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::common::{Member, PermDefaults};
use crate::error::{ConvertError, Result};

/// Suffix of every file block header line.
pub const FILE_MARKER: &[u8] = b"\t[[[1\n";
/// Line that ends the preamble.
pub const FINISH_LINE: &[u8] = b"finish\n";
/// Line the plain-text probe looks for.
pub const USE_VIMBALL: &str = "UseVimball";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const PROBE_LEN: u64 = 4096;

/// Iterates over the members of a Vimball read from `R`.
///
/// The whole stream is parsed on the first call to `next`, because every
/// directory has to be yielded before the first file. Framing errors are
/// reported once, after which the iterator is exhausted.
pub struct VimballReader<R> {
    path: PathBuf,
    defaults: PermDefaults,
    state: State<R>,
}

enum State<R> {
    Unread(R),
    Yielding(std::vec::IntoIter<Member>),
    Done,
}

impl VimballReader<BufReader<File>> {
    /// Opens a plain-text Vimball.
    pub fn open(path: &Path, defaults: PermDefaults) -> Result<Self> {
        let file = open_source(path)?;
        Ok(Self::new(BufReader::new(file), path, defaults))
    }
}

impl VimballReader<BufReader<MultiGzDecoder<File>>> {
    /// Opens a gzip-compressed Vimball.
    pub fn open_gz(path: &Path, defaults: PermDefaults) -> Result<Self> {
        let file = open_source(path)?;
        Ok(Self::new(BufReader::new(MultiGzDecoder::new(file)), path, defaults))
    }
}

impl<R: BufRead> VimballReader<R> {
    /// Wraps an already-open stream. `path` is only used in error messages.
    pub fn new(source: R, path: impl Into<PathBuf>, defaults: PermDefaults) -> Self {
        Self { path: path.into(), defaults, state: State::Unread(source) }
    }
}

impl<R: BufRead> Iterator for VimballReader<R> {
    type Item = Result<Member>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Unread(source) => match parse(source, &self.path, &self.defaults) {
                    Ok(members) => self.state = State::Yielding(members.into_iter()),
                    Err(e) => return Some(Err(e)),
                },
                State::Yielding(mut members) => {
                    let member = members.next()?;
                    self.state = State::Yielding(members);
                    return Some(Ok(member));
                }
                State::Done => return None,
            }
        }
    }
}

/// True if the first 4 KiB of `path` hold a `UseVimball` line and the file is not gzip data.
pub fn is_supported(path: &Path) -> bool {
    let Ok(head) = read_head(path, PROBE_LEN) else { return false };
    if head.starts_with(&GZIP_MAGIC) {
        return false;
    }
    String::from_utf8_lossy(&head)
        .split('\n')
        .any(|line| line.trim() == USE_VIMBALL)
}

/// True if `path` starts with the gzip magic number.
pub fn is_supported_gz(path: &Path) -> bool {
    read_head(path, GZIP_MAGIC.len() as u64).map_or(false, |head| head == GZIP_MAGIC)
}

fn read_head(path: &Path, len: u64) -> io::Result<Vec<u8>> {
    let mut head = Vec::with_capacity(len as usize);
    File::open(path)?.take(len).read_to_end(&mut head)?;
    Ok(head)
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| ConvertError::Construction {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Line-oriented view of the stream that keeps track of the line number.
struct Lines<'a, R> {
    source: R,
    path: &'a Path,
    line: Vec<u8>,
    lineno: usize,
}

impl<'a, R: BufRead> Lines<'a, R> {
    /// Reads the next line, newline included. Returns false at end of stream.
    fn advance(&mut self) -> Result<bool> {
        self.line.clear();
        let n = self
            .source
            .read_until(b'\n', &mut self.line)
            .map_err(|e| ConvertError::io(self.path, e))?;
        if n == 0 {
            return Ok(false);
        }
        self.lineno += 1;
        Ok(true)
    }

    fn error(&self, reason: &'static str) -> ConvertError {
        ConvertError::format(self.path, self.lineno, reason)
    }
}

fn parse<R: BufRead>(source: R, path: &Path, defaults: &PermDefaults) -> Result<Vec<Member>> {
    let mut lines = Lines { source, path, line: Vec::new(), lineno: 0 };

    loop {
        if !lines.advance()? {
            tracing::warn!(path = %path.display(), "no 'finish' line, archive is empty");
            return Ok(Vec::new());
        }
        if lines.line == FINISH_LINE {
            break;
        }
    }

    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut dirs: BTreeSet<String> = BTreeSet::new();

    while lines.advance()? {
        let name = lines
            .line
            .strip_suffix(FILE_MARKER)
            .and_then(|name| std::str::from_utf8(name).ok())
            .map(str::to_owned)
            .ok_or_else(|| lines.error("bad Vimball header"))?;

        if !lines.advance()? {
            return Err(lines.error("bad Vimball count"));
        }
        let count = parse_count(&lines.line).ok_or_else(|| lines.error("bad Vimball count"))?;

        let mut data = Vec::new();
        for _ in 0..count {
            if !lines.advance()? {
                return Err(lines.error("truncated Vimball"));
            }
            data.extend_from_slice(&lines.line);
        }

        if let Some(dir) = parent_dir(&name) {
            dirs.insert(dir.to_owned());
        }
        match seen.get(&name) {
            Some(&idx) => {
                tracing::warn!(name = %name, "duplicate Vimball entry, keeping the last content");
                files[idx].1 = data;
            }
            None => {
                seen.insert(name.clone(), files.len());
                files.push((name, data));
            }
        }
    }

    tracing::debug!(
        path = %path.display(),
        directories = dirs.len(),
        files = files.len(),
        "parsed Vimball"
    );

    let mut members = Vec::with_capacity(dirs.len() + files.len());
    members.extend(dirs.into_iter().map(|dir| Member::directory(dir, defaults)));
    members.extend(files.into_iter().map(|(name, data)| Member::file(name, data, defaults)));
    Ok(members)
}

fn parse_count(line: &[u8]) -> Option<usize> {
    let digits = line.strip_suffix(b"\n").unwrap_or(line);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Directory part of a slash-separated name; `None` for top-level names.
fn parent_dir(name: &str) -> Option<&str> {
    name.rsplit_once('/').map(|(dir, _)| dir).filter(|dir| !dir.is_empty())
}
