// src/fs/mod.rs

//! Read-only filesystem queries used at pattern-compile and initial-add time.
//!
//! Routing only reaches it when a new directory appears under a recursive
//! base, to pick up subdirectories that arrived with it.

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::types::TargetKind;

pub mod mock;

/// What the compiler and the directory enumerator need to know about disk.
pub trait FileSystem: Send + Sync + Debug {
    /// `None` when nothing exists at `path`.
    fn kind(&self, path: &Path) -> Option<TargetKind>;

    /// Full paths of the directories directly inside `path`.
    fn subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>>;

    fn is_file(&self, path: &Path) -> bool {
        self.kind(path) == Some(TargetKind::File)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.kind(path) == Some(TargetKind::Directory)
    }
}

/// `std::fs`-backed queries.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn kind(&self, path: &Path) -> Option<TargetKind> {
        let meta = fs::metadata(path).ok()?;
        if meta.is_dir() {
            Some(TargetKind::Directory)
        } else {
            Some(TargetKind::File)
        }
    }

    /// Symlinked directories are not descended into.
    fn subdirectories(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {path:?}"))? {
            let entry = entry.with_context(|| format!("reading entry of {path:?}"))?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        Ok(dirs)
    }
}
