use directories::ProjectDirs;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{DbError, Result};
use crate::models::{MessageLog, MessageRecord};

const DOCUMENT_NAME: &str = "messages.json";

/// Message log backed by a single JSON document.
///
/// Every mutation rewrites the whole document. Writers are serialized by an
/// in-process lock and the document is replaced through a rename, so readers
/// never observe a partially written file.
pub struct MessageStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MessageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn open_default() -> Result<Self> {
        let path = Self::default_path()?;
        tracing::info!("Message log at: {}", path.display());
        Ok(Self::new(path))
    }

    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "courier", "courier").ok_or(DbError::NoDataDir)?;
        Ok(dirs.data_dir().join(DOCUMENT_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full log. A missing document is an empty log.
    pub async fn load(&self) -> Result<MessageLog> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(MessageLog::default()),
            Err(source) => {
                return Err(DbError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| DbError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the document with `log`.
    pub async fn save(&self, log: &MessageLog) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_document(log).await
    }

    /// Appends `records` in order within one load-modify-save cycle and
    /// returns the resulting log length.
    pub async fn append(&self, records: Vec<MessageRecord>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;

        let mut log = self.load().await?;
        let added = records.len();
        log.messages.extend(records);
        self.write_document(&log).await?;

        tracing::debug!(added, total = log.len(), "Appended to message log");
        Ok(log.len())
    }

    async fn write_document(&self, log: &MessageLog) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }

        let bytes = serde_json::to_vec_pretty(log)?;
        let tmp_path = self.tmp_path();

        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|source| self.io_error(source))?;
        file.write_all(&bytes)
            .await
            .map_err(|source| self.io_error(source))?;
        file.sync_all()
            .await
            .map_err(|source| self.io_error(source))?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| self.io_error(source))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn io_error(&self, source: std::io::Error) -> DbError {
        DbError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_document_loads_empty() {
        let dir = tempdir().unwrap();
        let store = MessageStore::new(dir.path().join("messages.json"));
        let log = store.load().await.unwrap();
        assert!(log.is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn save_then_load_keeps_order_and_fields() {
        let dir = tempdir().unwrap();
        let store = MessageStore::new(dir.path().join("messages.json"));
        let log = MessageLog {
            messages: vec![
                MessageRecord::outgoing("wamid.1", "15551234567", "merhaba dünya"),
                MessageRecord::incoming("m1", "15550001111", ""),
                MessageRecord::outgoing("", "15551234567", "second"),
            ],
        };

        store.save(&log).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, log);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("merhaba dünya"));
    }

    #[tokio::test]
    async fn append_creates_parent_dirs_and_accumulates() {
        let dir = tempdir().unwrap();
        let store = MessageStore::new(dir.path().join("nested").join("log.json"));

        let total = store
            .append(vec![MessageRecord::incoming("a", "1", "x")])
            .await
            .unwrap();
        assert_eq!(total, 1);

        let total = store
            .append(vec![
                MessageRecord::incoming("b", "2", "y"),
                MessageRecord::outgoing("c", "3", "z"),
            ])
            .await
            .unwrap();
        assert_eq!(total, 3);

        let log = store.load().await.unwrap();
        let ids: Vec<_> = log.messages.iter().map(|m| m.id()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(log.messages[2].direction(), Direction::Outgoing);
        assert!(!store.tmp_path().exists());
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let dir = tempdir().unwrap();
        let store = Arc::new(MessageStore::new(dir.path().join("messages.json")));

        let mut handles = Vec::new();
        for i in 0..25 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append(vec![MessageRecord::incoming(&format!("m{i}"), "1555", "hi")])
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.load().await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn corrupt_document_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = MessageStore::new(&path);
        assert!(matches!(store.load().await, Err(DbError::Corrupt { .. })));
        assert!(matches!(
            store.append(vec![MessageRecord::incoming("m", "1", "")]).await,
            Err(DbError::Corrupt { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }
}
