/*!
 * Local File Backing Store
 * One JSON file per key under a host directory
 */

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::traits::{KvStore, StoreError, StoreResult};

const RECORD_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "json.tmp";

/// File-backed key-value store
///
/// Writes go to a temporary file that is synced and then renamed over the
/// record, so neither a reader nor a crash leaves a half-written record.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`
    pub async fn open<P: Into<PathBuf>>(root: P) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot open {}: {}", root.display(), e))
        })?;

        let metadata = fs::metadata(&root).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot stat {}: {}", root.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        debug!(root = %root.display(), "file store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its record file
    ///
    /// Bytes outside [A-Za-z0-9_-] are percent-encoded so distinct keys never
    /// share a file and no key can escape the root.
    fn record_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + RECORD_EXTENSION.len() + 1);
        for byte in key.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                name.push(byte as char);
            } else {
                name.push_str(&format!("%{:02X}", byte));
            }
        }
        name.push('.');
        name.push_str(RECORD_EXTENSION);
        self.root.join(name)
    }

    fn io_error(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            source,
        }
    }
}

#[async_trait]
impl KvStore for FileStore {
    #[instrument(skip(self), fields(store = "file"))]
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let path = self.record_path(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(key, e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    #[instrument(skip(self, value), fields(store = "file"))]
    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        let path = self.record_path(key);
        let temp = path.with_extension(TEMP_EXTENSION);
        let bytes = serde_json::to_vec(&value)?;

        let mut file = fs::File::create(&temp)
            .await
            .map_err(|e| Self::io_error(key, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| Self::io_error(key, e))?;
        file.sync_all()
            .await
            .map_err(|e| Self::io_error(key, e))?;
        drop(file);

        fs::rename(&temp, &path)
            .await
            .map_err(|e| Self::io_error(key, e))?;

        debug!(bytes = bytes.len(), "record written");
        Ok(())
    }

    #[instrument(skip(self), fields(store = "file"))]
    async fn delete(&self, key: &str) -> StoreResult<()> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    #[instrument(skip(self), fields(store = "file"))]
    async fn clear(&self) -> StoreResult<()> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::Unavailable(format!("cannot list store: {}", e)))?;

        let mut removed = 0usize;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Unavailable(format!("cannot list store: {}", e)))?
        {
            let path = entry.path();
            let is_record = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(RECORD_EXTENSION) || n.ends_with(TEMP_EXTENSION));
            if is_record {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| Self::io_error(&path.display().to_string(), e))?;
                removed += 1;
            }
        }

        debug!(removed, "store cleared");
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}
