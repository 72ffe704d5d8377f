//! Host filesystem capabilities.
//!
//! The archive layer never walks the OS filesystem itself; it consumes the
//! [`TreeReader`] and [`TreeWriter`] traits. The fs-backed implementations
//! here cover the common case; tests and embedded hosts supply in-memory
//! ones.
//!
//! Paths crossing this boundary are always `/`-separated and relative to the
//! tree root, matching what the archive stores on disk.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A file discovered under a tree root.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// `/`-separated path relative to the root.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
}

/// Enumerate and read the files of a tree.
pub trait TreeReader {
    /// Concrete reader for one file's contents.
    type File: Read;

    /// All files under the root, in the order they will be archived.
    fn entries(&mut self) -> Result<Vec<TreeEntry>>;

    /// Open one file for sequential reads.
    fn open(&mut self, path: &str) -> Result<Self::File>;

    /// Total size of all files in the tree.
    fn total_size(&mut self) -> Result<u64> {
        Ok(self.entries()?.iter().map(|e| e.size).sum())
    }
}

/// Create files under a tree root.
pub trait TreeWriter {
    /// Concrete writer for one file's contents.
    type File: Write;

    /// Create (or truncate) a file, creating missing parent directories.
    ///
    /// Callers are responsible for validating untrusted paths first; the
    /// archive decoder does so before any entry reaches this method.
    fn create(&mut self, path: &str) -> Result<Self::File>;
}

/// [`TreeReader`] over a real directory.
///
/// Files are visited depth-first with each directory's entries in sorted
/// name order, so the same tree always archives in the same order.
pub struct DirTreeReader {
    root: PathBuf,
}

impl DirTreeReader {
    /// Read the tree rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn walk(&self, dir: &Path, prefix: &str, out: &mut Vec<TreeEntry>) -> Result<()> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry
                .file_name()
                .into_string()
                .map_err(|_| Error::Parse("file name is not valid UTF-8"))?;
            names.push((name, entry.path()));
        }
        names.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path) in names {
            let rel = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            let meta = fs::metadata(&path)?;
            if meta.is_dir() {
                self.walk(&path, &rel, out)?;
            } else if meta.is_file() {
                out.push(TreeEntry {
                    path: rel,
                    size: meta.len(),
                });
            }
        }
        Ok(())
    }
}

impl TreeReader for DirTreeReader {
    type File = File;

    fn entries(&mut self) -> Result<Vec<TreeEntry>> {
        let mut out = Vec::new();
        self.walk(&self.root, "", &mut out)?;
        Ok(out)
    }

    fn open(&mut self, path: &str) -> Result<File> {
        Ok(File::open(self.root.join(path))?)
    }
}

/// [`TreeWriter`] over a real directory.
pub struct DirTreeWriter {
    root: PathBuf,
}

impl DirTreeWriter {
    /// Write files under `root`, creating it on first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TreeWriter for DirTreeWriter {
    type File = File;

    fn create(&mut self, path: &str) -> Result<File> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(File::create(full)?)
    }
}
