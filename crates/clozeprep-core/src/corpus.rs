//! # Example enumeration
//!
//! Lists the question files of a dataset directory and yields them one pass
//! at a time. A pass is a snapshot: it lists regular files once, sorts them
//! by name for a stable baseline, then optionally shuffles with the injected
//! RNG. Starting a new pass re-lists (and re-shuffles) from scratch.

use std::fs;
use std::path::{Path, PathBuf};

use oorandom::Rand32;

use crate::error::{PrepError, Result};
use crate::shuffle::shuffle;

/// A dataset directory of question files.
#[derive(Debug, Clone)]
pub struct ExampleDir {
    path: PathBuf,
    shuffle: bool,
}

impl ExampleDir {
    /// Creates an enumerator over `path`. When `shuffle` is set, every pass
    /// visits the files in a fresh random order.
    pub fn new(path: impl Into<PathBuf>, shuffle: bool) -> Self {
        Self {
            path: path.into(),
            shuffle,
        }
    }

    /// The directory being enumerated.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Starts one pass over the directory.
    pub fn pass(&self, rng: &mut Rand32) -> Result<DirPass> {
        let entries = fs::read_dir(&self.path).map_err(|source| PrepError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PrepError::Io {
                path: self.path.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        if self.shuffle {
            shuffle(rng, &mut files);
        }

        Ok(DirPass {
            files: files.into_iter(),
        })
    }
}

/// One pass over a dataset directory; yields file paths, then exhausts.
#[derive(Debug)]
pub struct DirPass {
    files: std::vec::IntoIter<PathBuf>,
}

impl DirPass {
    /// Number of files remaining in this pass.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl Iterator for DirPass {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        self.files.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.files.size_hint()
    }
}
