//! Crash-safe file replacement inside the snapshot directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot directory {}: {source}", path.display())]
    Dir { path: PathBuf, source: io::Error },
    #[error("writing {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Create `dir` (and parents) unless it already is a directory.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    let dir_error = |source: io::Error| PersistError::Dir {
        path: dir.to_path_buf(),
        source,
    };
    fs::create_dir_all(dir).map_err(dir_error)?;
    if !fs::metadata(dir).map_err(dir_error)?.is_dir() {
        return Err(dir_error(io::Error::other("not a directory")));
    }
    Ok(())
}

/// Replace `{dir}/{filename}` with `content`. Readers see the old file or the new one, never a mix.
pub fn replace_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
    ensure_dir(dir)?;
    let target = dir.join(filename);
    let write_error = |source: io::Error| PersistError::Write {
        path: target.clone(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error)?;
    tmp.write_all(content).map_err(write_error)?;
    tmp.as_file_mut().sync_all().map_err(write_error)?;
    tmp.persist(&target).map_err(|err| write_error(err.error))?;
    Ok(target)
}
