//! Output tree writing.
//!
//! Each emitter owns one root directory: it is wiped before a run and every
//! rendered file is written below it.

use crate::error::WriteError;
use std::path::{Path, PathBuf};

/// Outcome of writing one generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// The file is on disk.
    Written { path: PathBuf, bytes: usize },
    /// Dry run: the file was rendered but not written.
    DryRun { content: String, path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        let (Self::Written { path, .. } | Self::DryRun { path, .. }) = self;
        path
    }

    pub fn was_written(&self) -> bool {
        self.dry_run_content().is_none()
    }

    /// Bytes on disk, 0 for a dry run.
    pub fn bytes(&self) -> usize {
        if let Self::Written { bytes, .. } = self {
            *bytes
        } else {
            0
        }
    }

    /// Rendered content held back by a dry run.
    pub fn dry_run_content(&self) -> Option<&str> {
        if let Self::DryRun { content, .. } = self {
            Some(content)
        } else {
            None
        }
    }
}

/// Writes generated files below an emitter's output root.
///
/// In dry-run mode nothing on disk is touched; every write is answered with
/// [`WriteResult::DryRun`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileWriter {
    dry_run: bool,
}

impl FileWriter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Replace `root` with an empty directory.
    pub fn clean_dir(&self, root: &Path) -> Result<(), WriteError> {
        if self.dry_run {
            return Ok(());
        }
        if root.exists() {
            std::fs::remove_dir_all(root).map_err(|source| WriteError::CleanDir {
                path: root.to_path_buf(),
                source,
            })?;
        }
        create_dirs(root)
    }

    /// Write `content` to `path`, creating missing parent directories.
    pub fn write(&self, path: &Path, content: &str) -> Result<WriteResult, WriteError> {
        let path = path.to_path_buf();
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: content.to_string(),
                path,
            });
        }

        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => create_dirs(dir)?,
            _ => {}
        }
        match std::fs::write(&path, content) {
            Ok(()) => Ok(WriteResult::Written {
                path,
                bytes: content.len(),
            }),
            Err(source) => Err(WriteError::WriteFile { path, source }),
        }
    }
}

fn create_dirs(dir: &Path) -> Result<(), WriteError> {
    std::fs::create_dir_all(dir).map_err(|source| WriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
