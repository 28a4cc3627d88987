pub mod file;
pub mod memory;

use std::fmt::Debug;

use thiserror::Error;

/// Backing-store write or read rejected by the underlying medium.
#[derive(Debug, Error)]
#[error("storage access failed for key {key:?}: {cause}")]
pub struct StorageError {
    key: String,
    cause: anyhow::Error,
}

impl StorageError {
    pub fn new(key: &str, cause: anyhow::Error) -> StorageError {
        StorageError {
            key: key.to_string(),
            cause,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Process-local key-value persistence. One key holds one text value;
/// writes replace the whole value atomically.
pub trait KeyValueStorage: Debug {
    fn read(&self, key: &str) -> StorageResult<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> StorageResult<()>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}
