//! Materializes members as a fresh directory tree.

use std::path::{Path, PathBuf};

use super::{check_name, ArchiveWrite};
use crate::common::Member;
use crate::error::{ConvertError, Result};
use crate::fsx as fs;

/// Creates the destination root on construction and never touches an existing one.
///
/// Directories are created with the member's permission bits; files are
/// written with the process defaults. Missing ancestors of a member are
/// created with default permissions first.
pub struct DirectoryWriter {
    root: PathBuf,
}

impl DirectoryWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let root: PathBuf = path.components().collect();
        if fs::symlink_metadata(&root).is_ok() {
            return Err(ConvertError::Construction {
                path: root,
                reason: "destination already exists".into(),
            });
        }
        fs::create_dir(&root).map_err(|e| ConvertError::Construction {
            path: root.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArchiveWrite for DirectoryWriter {
    fn add(&mut self, member: Member) -> Result<()> {
        check_name(member.name())?;
        let target = self.root.join(member.name());
        if let Some(parent) = target.parent().filter(|p| !p.is_dir()) {
            tracing::debug!(path = %parent.display(), "creating missing ancestors");
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }
        if member.is_dir() {
            tracing::debug!(path = %target.display(), mode = format_args!("{:o}", member.perm()), "creating directory");
            fs::create_dir_with_mode(&target, member.perm()).map_err(|e| ConvertError::io(&target, e))
        } else {
            tracing::debug!(path = %target.display(), "writing file");
            let data = member.into_data().unwrap_or_default();
            fs::write(&target, data).map_err(|e| ConvertError::io(&target, e))
        }
    }
}
