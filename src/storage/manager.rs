//! Storage Manager
//!
//! Thin filesystem operations behind the one-shot verbs and the two
//! transfers.
//!
//! ## Responsibilities
//! - Resolve every path argument against the root directory
//! - Classify host errors into typed [`FileWireError`] variants
//! - Store uploads without ever replacing an existing file
//!
//! Paths are joined onto the root as given: no normalization, no
//! containment check.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::error::{FileWireError, Result};

use super::naming;

/// Filesystem adapter rooted at one directory
#[derive(Debug, Clone)]
pub struct StorageManager {
    /// Directory relative arguments are resolved against
    root: PathBuf,
}

impl StorageManager {
    /// Open storage at `root`, creating the directory if needed
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where an argument points on disk
    pub fn resolve(&self, arg: &str) -> PathBuf {
        self.root.join(arg)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// Names of the regular files directly under `path`, sorted
    pub fn list_files(&self, path: &str) -> Result<Vec<String>> {
        self.list_where(path, |p| p.is_file())
    }

    /// Names of the subdirectories directly under `path`, sorted
    pub fn list_dirs(&self, path: &str) -> Result<Vec<String>> {
        self.list_where(path, |p| p.is_dir())
    }

    fn list_where(&self, path: &str, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>> {
        let dir = self.resolve(path);
        if !dir.exists() {
            return Err(FileWireError::NotFound(path.to_string()));
        }
        if !dir.is_dir() {
            return Err(FileWireError::NotADirectory(path.to_string()));
        }

        let entries = fs::read_dir(&dir).map_err(|e| FileWireError::from_io(e, path))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FileWireError::from_io(e, path))?;
            if keep(&entry.path()) {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Whole content of a regular file
    pub fn read_file(&self, file: &str) -> Result<Bytes> {
        let path = self.resolve(file);
        if !path.is_file() {
            return Err(if path.exists() {
                FileWireError::NotAFile(file.to_string())
            } else {
                FileWireError::NotFound(file.to_string())
            });
        }
        let content = fs::read(&path).map_err(|e| FileWireError::from_io(e, file))?;
        Ok(Bytes::from(content))
    }

    /// Store an uploaded payload under the base name of `announced`.
    ///
    /// Returns the name actually used, which carries a `-copia` suffix
    /// when the plain name is taken.
    pub fn store_upload(&self, announced: &str, content: &[u8]) -> Result<String> {
        let base = base_name(announced)?;

        let mut attempt = 0;
        loop {
            let candidate = naming::copy_name(&base, attempt);
            let target = self.root.join(&candidate);
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&target) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    attempt += 1;
                    continue;
                }
                Err(e) => return Err(FileWireError::from_io(e, announced)),
            };

            fill_new(&mut file, &target, content)
                .and_then(|_| file.sync_all().map_err(|e| discard(&target, e)))
                .map_err(|e| FileWireError::from_io(e, announced))?;

            if attempt > 0 {
                tracing::info!("'{}' exists, stored upload as '{}'", base, candidate);
            }
            return Ok(candidate);
        }
    }

    pub fn delete_file(&self, file: &str) -> Result<()> {
        fs::remove_file(self.resolve(file)).map_err(|e| FileWireError::from_io(e, file))
    }

    /// Rename a regular file; the new name is resolved against the root too
    pub fn rename_file(&self, file: &str, new_name: &str) -> Result<()> {
        let from = self.resolve(file);
        if !from.is_file() {
            return Err(FileWireError::NotAFile(file.to_string()));
        }
        fs::rename(&from, self.resolve(new_name)).map_err(|e| FileWireError::from_io(e, file))
    }

    /// Copy `file` into `dest_dir` (created if missing), then remove the
    /// original. Returns the base name written.
    pub fn move_file(&self, file: &str, dest_dir: &str) -> Result<String> {
        let from = self.resolve(file);
        let content = fs::read(&from).map_err(|e| FileWireError::from_io(e, file))?;

        let dest = self.resolve(dest_dir);
        fs::create_dir_all(&dest).map_err(|e| FileWireError::from_io(e, dest_dir))?;

        let base = base_name(file)?;
        let target = dest.join(&base);

        // Moving onto itself would truncate the source before removing it
        if same_file(&from, &target) {
            tracing::debug!("'{}' is already in '{}'", file, dest_dir);
            return Ok(base);
        }

        fs::write(&target, &content).map_err(|e| FileWireError::from_io(e, dest_dir))?;
        fs::remove_file(&from).map_err(|e| FileWireError::from_io(e, file))?;
        Ok(base)
    }

    // =========================================================================
    // Directories
    // =========================================================================

    /// Create one directory; anything already at that path is an error
    pub fn create_dir(&self, name: &str) -> Result<()> {
        let path = self.resolve(name);
        if path.exists() {
            return Err(FileWireError::AlreadyExists(name.to_string()));
        }
        fs::create_dir(&path).map_err(|e| FileWireError::from_io(e, name))
    }

    /// Remove an existing, empty directory
    pub fn delete_dir(&self, name: &str) -> Result<()> {
        let path = self.resolve(name);
        if !path.exists() {
            return Err(FileWireError::NotFound(name.to_string()));
        }
        if !path.is_dir() {
            return Err(FileWireError::NotADirectory(name.to_string()));
        }

        let mut entries = fs::read_dir(&path).map_err(|e| FileWireError::from_io(e, name))?;
        if entries.next().is_some() {
            return Err(FileWireError::DirectoryNotEmpty(name.to_string()));
        }

        fs::remove_dir(&path).map_err(|e| FileWireError::from_io(e, name))
    }
}

/// Final path component of an argument, directory parts stripped
pub fn base_name(arg: &str) -> Result<String> {
    Path::new(arg)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| FileWireError::InvalidName(arg.to_string()))
}

/// Write a whole payload into a file just created at `target`.
///
/// On failure the file is removed, so a broken upload neither stays on
/// disk nor pushes later uploads of the same name onto a `-copia` name.
pub fn fill_new<W: Write>(file: &mut W, target: &Path, content: &[u8]) -> io::Result<()> {
    file.write_all(content)
        .and_then(|_| file.flush())
        .map_err(|e| discard(target, e))
}

fn discard(target: &Path, error: io::Error) -> io::Error {
    if let Err(e) = fs::remove_file(target) {
        tracing::warn!("Could not remove partial upload {}: {}", target.display(), e);
    }
    error
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
