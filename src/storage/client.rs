use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::AppError;

/// Trait for uploaded-file storage.
///
/// Keys are flat file names. Abstracted as a trait so tests can use a mock
/// instead of the filesystem.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Store content under the given key, replacing any existing object.
    async fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), AppError>;

    /// Remove an object. Returns `false` if there was nothing to remove.
    async fn delete_object(&self, key: &str) -> Result<bool, AppError>;
}

/// Local-disk implementation of StorageClient, rooted at the uploads directory.
pub struct LocalStorageClient {
    root: PathBuf,
}

impl LocalStorageClient {
    /// Create the client, making sure the root directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create uploads directory '{}': {e}",
                root.display()
            ))
        })?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        if key.is_empty()
            || key.starts_with('.')
            || key.contains(['/', '\\'])
            || key.contains("..")
        {
            return Err(AppError::Storage(format!("Invalid object key '{key}'")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for LocalStorageClient {
    async fn put_object(&self, key: &str, content: Vec<u8>) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write '{key}': {e}")))
    }

    async fn delete_object(&self, key: &str) -> Result<bool, AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!("Failed to delete '{key}': {e}"))),
        }
    }
}
