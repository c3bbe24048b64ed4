use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use schedule_core::SourceSnapshot;
use thiserror::Error;

use crate::filename::snapshot_filename;
use crate::persist::replace_file;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("snapshot read failed: {0}")]
    Read(String),
    #[error("snapshot write failed: {0}")]
    Write(String),
}

/// Last committed snapshot per source id.
///
/// `get` returns `Ok(None)` when nothing was ever stored for the id; that is
/// a normal first run, not an error.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(&self, source_id: &str) -> Result<Option<SourceSnapshot>, StoreError>;
    async fn put(&self, source_id: &str, snapshot: &SourceSnapshot) -> Result<(), StoreError>;
}

/// One RON file per source in a single directory.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, source_id: &str) -> PathBuf {
        self.dir.join(snapshot_filename(source_id))
    }
}

#[async_trait::async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn get(&self, source_id: &str) -> Result<Option<SourceSnapshot>, StoreError> {
        let path = self.path_for(source_id);
        let source_id = source_id.to_string();
        tokio::task::spawn_blocking(move || load_snapshot(&path, &source_id))
            .await
            .map_err(|err| StoreError::Read(err.to_string()))?
    }

    async fn put(&self, source_id: &str, snapshot: &SourceSnapshot) -> Result<(), StoreError> {
        let dir = self.dir.clone();
        let filename = snapshot_filename(source_id);
        let snapshot = snapshot.clone();
        tokio::task::spawn_blocking(move || save_snapshot(dir, &filename, &snapshot))
            .await
            .map_err(|err| StoreError::Write(err.to_string()))?
    }
}

fn load_snapshot(path: &Path, source_id: &str) -> Result<Option<SourceSnapshot>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::Read(format!("{}: {err}", path.display()))),
    };

    let snapshot: SourceSnapshot = ron::from_str(&content)
        .map_err(|err| StoreError::Read(format!("{}: {err}", path.display())))?;
    if snapshot.source_id != source_id {
        return Err(StoreError::Read(format!(
            "{} holds snapshot for {:?}",
            path.display(),
            snapshot.source_id
        )));
    }
    Ok(Some(snapshot))
}

fn save_snapshot(
    dir: PathBuf,
    filename: &str,
    snapshot: &SourceSnapshot,
) -> Result<(), StoreError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(snapshot, pretty)
        .map_err(|err| StoreError::Write(err.to_string()))?;

    replace_file(&dir, filename, content.as_bytes())
        .map(|_| ())
        .map_err(|err| StoreError::Write(err.to_string()))
}
