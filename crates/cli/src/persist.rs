//! All-or-nothing writing of a run's output files.
//!
//! Every file is first written to a temporary sibling; the temporaries are
//! renamed into place only after all of them were written. A destination
//! that already exists is moved aside first and put back if the run fails,
//! so a failed run leaves the directory as it found it.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};

#[derive(Debug, Clone)]
pub struct PendingFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

#[derive(Debug)]
pub struct PersistError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot write {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// A destination this run has put in place, with whatever it replaced.
struct Placed<'a> {
    path: &'a Path,
    previous: Option<TempPath>,
}

pub fn write_all(files: &[PendingFile]) -> Result<(), PersistError> {
    let mut staged = Vec::with_capacity(files.len());
    for file in files {
        let tmp = stage(file).map_err(|source| PersistError { path: file.path.clone(), source })?;
        staged.push((tmp, file.path.as_path()));
    }

    let mut placed: Vec<Placed<'_>> = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        let previous = match set_aside(path) {
            Ok(previous) => previous,
            Err(source) => {
                roll_back(placed);
                return Err(PersistError { path: path.to_path_buf(), source });
            }
        };
        if let Err(e) = tmp.persist(path) {
            if let Some(previous) = previous {
                restore(previous, path);
            }
            roll_back(placed);
            return Err(PersistError { path: path.to_path_buf(), source: e.error });
        }
        placed.push(Placed { path, previous });
    }

    // Dropping the set-aside copies deletes them
    Ok(())
}

fn stage(file: &PendingFile) -> io::Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(parent_dir(&file.path))?;
    tmp.write_all(&file.contents)?;
    tmp.flush()?;
    Ok(tmp)
}

/// Move an existing regular file at `path` to a temporary sibling.
fn set_aside(path: &Path) -> io::Result<Option<TempPath>> {
    if !path.is_file() {
        return Ok(None);
    }
    let slot = tempfile::Builder::new()
        .prefix(".tabrecon-prev-")
        .tempfile_in(parent_dir(path))?
        .into_temp_path();
    fs::rename(path, &slot)?;
    log::debug!("moved existing '{}' aside", path.display());
    Ok(Some(slot))
}

fn restore(previous: TempPath, path: &Path) {
    if let Err(e) = previous.persist(path) {
        log::warn!(
            "rollback: cannot restore previous '{}' (kept at '{}'): {}",
            path.display(),
            e.path.display(),
            e.error
        );
        // Keep the copy on disk rather than losing it
        let _kept = e.path.keep();
    }
}

fn roll_back(placed: Vec<Placed<'_>>) {
    for entry in placed.into_iter().rev() {
        match entry.previous {
            Some(previous) => restore(previous, entry.path),
            None => {
                if let Err(e) = fs::remove_file(entry.path) {
                    log::warn!("rollback: cannot remove '{}': {e}", entry.path.display());
                }
            }
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
