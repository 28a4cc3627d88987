use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::storage::{KeyValueStorage, StorageError, StorageResult};

/// Durable storage rooted at a directory, one `<key>.json` file per key.
/// Values are replaced atomically so a rejected write leaves the previous
/// value intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> FileStorage {
        FileStorage {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn write_value(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed creating storage directory {:?}", self.dir))?;

        let mut tmp_file = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("failed creating temporary file in {:?}", self.dir))?;
        tmp_file.write_all(value.as_bytes())?;
        tmp_file.flush()?;
        tmp_file.persist(self.value_path(key))?;

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("failed reading {:?}", path))
            .map_err(|cause| StorageError::new(key, cause))
    }

    fn write(&mut self, key: &str, value: &str) -> StorageResult<()> {
        log::debug!("writing {} bytes under key {:?}", value.len(), key);
        self.write_value(key, value)
            .map_err(|cause| StorageError::new(key, cause))
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.value_path(key);
        if !path.exists() {
            return Ok(());
        }

        fs::remove_file(&path)
            .with_context(|| format!("failed removing {:?}", path))
            .map_err(|cause| StorageError::new(key, cause))
    }
}
