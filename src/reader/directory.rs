//! Reads a directory tree as a sequence of members.

use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::common::{Member, PermDefaults};
use crate::error::{ConvertError, Result};
use crate::fsx as fs;

/// Walks `root` once at construction, then stats and reads each entry on demand.
///
/// All subdirectories are yielded before any file. Permissions and
/// modification times come straight from the filesystem. Symlinks and special
/// files are skipped.
pub struct DirectoryReader {
    root: PathBuf,
    defaults: PermDefaults,
    pending: VecDeque<String>,
}

impl DirectoryReader {
    pub fn open(path: &Path, defaults: PermDefaults) -> Result<Self> {
        let root: PathBuf = path.components().collect();
        if !root.is_dir() {
            return Err(ConvertError::Construction {
                path: root,
                reason: "not a directory".into(),
            });
        }

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in WalkDir::new(&root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().map_or_else(|| root.clone(), Path::to_path_buf);
                ConvertError::io(path, e.into())
            })?;
            let file_type = entry.file_type();
            if !file_type.is_dir() && !file_type.is_file() {
                tracing::warn!(path = %entry.path().display(), "skipping symlink or special file");
                continue;
            }
            let name = member_name(&root, entry.path())?;
            if file_type.is_dir() {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }

        tracing::debug!(
            root = %root.display(),
            directories = dirs.len(),
            files = files.len(),
            "walked directory"
        );

        let mut pending: VecDeque<String> = dirs.into();
        pending.extend(files);
        Ok(Self { root, defaults, pending })
    }

    fn load(&self, name: &str) -> Result<Member> {
        let path = self.root.join(name);
        let meta = fs::metadata(&path).map_err(|e| ConvertError::io(&path, e))?;

        let mut member = Member::new(name, &self.defaults);
        member.set_perm(fs::unix_mode(&meta));
        let modified = meta.modified().map_err(|e| ConvertError::io(&path, e))?;
        member.set_mtime_from_system(modified);

        if !meta.is_dir() {
            let data = fs::read(&path).map_err(|e| ConvertError::io(&path, e))?;
            member.set_data(data);
        }
        Ok(member)
    }
}

impl Iterator for DirectoryReader {
    type Item = Result<Member>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.pending.pop_front()?;
        let member = self.load(&name);
        if member.is_err() {
            self.pending.clear();
        }
        Some(member)
    }
}

/// True if `path` is a directory.
pub fn is_supported(path: &Path) -> bool {
    path.is_dir()
}

/// Forward-slash name of `path` relative to `root`.
fn member_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| ConvertError::Construction {
        path: path.to_path_buf(),
        reason: format!("not inside '{}'", root.display()),
    })?;
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| ConvertError::Construction {
                path: path.to_path_buf(),
                reason: "file name is not valid UTF-8".into(),
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}
