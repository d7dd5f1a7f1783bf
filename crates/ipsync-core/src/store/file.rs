// # File Config Store
//
// File-based implementation of ConfigStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write to `.tmp` (mode 0600 on unix), fsync, then rename
// - Automatic backup: each written document is mirrored to `.backup`
// - Recovery: a corrupted document is restored from the backup on open
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "base_url": "http://10.0.0.5:7777/",
//   "saved_at": "2025-01-09T12:00:00Z"
// }
// ```
//
// On unix the document is created with mode 0600: the endpoint is private
// to the user running the client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::ConfigStore;

/// Config file format version
const CONFIG_FILE_VERSION: &str = "1.0";

/// File-based config store with crash recovery
///
/// The document is read once on [`FileConfigStore::new`]; afterwards the
/// in-memory copy answers `load` and every `save` is written through.
///
/// # Example
///
/// ```rust,no_run
/// use ipsync_core::store::FileConfigStore;
/// use ipsync_core::traits::ConfigStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileConfigStore::new("/home/me/.config/ipsync/config.json").await?;
///
///     store.save("http://10.0.0.5:7777/").await?;
///     assert_eq!(store.load().await, "http://10.0.0.5:7777/");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
    base_url: Arc<RwLock<String>>,
}

/// Serializable config file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ConfigFileFormat {
    version: String,
    #[serde(default)]
    base_url: String,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

impl FileConfigStore {
    /// Open (or lazily create) a file config store
    ///
    /// This will:
    /// 1. Create parent directories if needed
    /// 2. Try to load the existing document
    /// 3. If it is corrupted, recover from the backup
    /// 4. If nothing usable is found, start unconfigured
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config_store(format!(
                        "Failed to create config directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let base_url = Self::load_with_recovery(&path).await;

        Ok(Self {
            path,
            base_url: Arc::new(RwLock::new(base_url)),
        })
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the endpoint, falling back to the backup and then to unset
    async fn load_with_recovery(path: &Path) -> String {
        match Self::load_document(path).await {
            Ok(Some(doc)) => {
                tracing::debug!("Loaded endpoint from {}", path.display());
                return doc.base_url;
            }
            Ok(None) => return String::new(),
            Err(Error::Json(e)) => {
                tracing::warn!(
                    "Config file {} appears corrupted: {}. Attempting recovery from backup.",
                    path.display(),
                    e
                );
            }
            Err(e) => {
                tracing::warn!("Config file unreadable, treating endpoint as unset: {}", e);
                return String::new();
            }
        }

        let backup_path = Self::backup_path(path);
        match Self::load_document(&backup_path).await {
            Ok(Some(doc)) => {
                tracing::info!("Recovered endpoint from backup");
                if let Err(e) = fs::copy(&backup_path, path).await {
                    tracing::error!("Failed to restore config file from backup: {}", e);
                }
                doc.base_url
            }
            Ok(None) => {
                tracing::warn!("No backup file found. Starting unconfigured.");
                String::new()
            }
            Err(e) => {
                tracing::error!("Backup also unusable: {}. Starting unconfigured.", e);
                String::new()
            }
        }
    }

    /// Read and parse a document; `Ok(None)` when the file does not exist
    async fn load_document(path: &Path) -> Result<Option<ConfigFileFormat>, Error> {
        if !path.exists() {
            tracing::debug!("Config file does not exist: {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config_store(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let doc: ConfigFileFormat = serde_json::from_str(&content)?;

        if doc.version != CONFIG_FILE_VERSION {
            tracing::warn!(
                "Config file version mismatch: expected {}, got {}. Attempting to load anyway.",
                CONFIG_FILE_VERSION,
                doc.version
            );
        }

        Ok(Some(doc))
    }

    /// Write the document atomically
    async fn write_document(&self, base_url: &str) -> Result<(), Error> {
        let doc = ConfigFileFormat {
            version: CONFIG_FILE_VERSION.to_string(),
            base_url: base_url.to_string(),
            saved_at: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&doc)?;

        let temp_path = self.temp_path();

        // A stale temp file would keep its old mode; start from scratch
        if let Err(e) = fs::remove_file(&temp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove stale temp file {}: {}", temp_path.display(), e);
            }
        }

        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create_new(true);
            #[cfg(unix)]
            options.mode(0o600);

            let mut file = options.open(&temp_path).await.map_err(|e| {
                Error::config_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::config_store(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::config_store(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::config_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        // Backup mirrors the document just written
        if let Err(e) = fs::copy(&self.path, Self::backup_path(&self.path)).await {
            tracing::warn!("Failed to create backup: {}", e);
        }

        tracing::trace!("Config written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> String {
        self.base_url.read().await.clone()
    }

    async fn save(&self, value: &str) -> Result<(), Error> {
        // Held across the write so concurrent saves land on disk in call order
        let mut guard = self.base_url.write().await;
        self.write_document(value).await?;
        *guard = value.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_unset_when_missing() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.json")).await.unwrap();
        assert_eq!(store.load().await, "");
    }

    #[tokio::test]
    async fn test_save_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let store = FileConfigStore::new(&path).await.unwrap();
        store.save("http://10.0.0.5:7777/").await.unwrap();
        assert!(path.exists());

        let reopened = FileConfigStore::new(&path).await.unwrap();
        assert_eq!(reopened.load().await, "http://10.0.0.5:7777/");
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = FileConfigStore::new(&path).await.unwrap();
        store.save("http://a/").await.unwrap();
        store.save("http://b/").await.unwrap();
        assert_eq!(store.load().await, "http://b/");

        let reopened = FileConfigStore::new(&path).await.unwrap();
        assert_eq!(reopened.load().await, "http://b/");
    }

    #[tokio::test]
    async fn test_corruption_recovers_latest_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = FileConfigStore::new(&path).await.unwrap();
        store.save("http://first/").await.unwrap();
        store.save("http://second/").await.unwrap();
        assert!(FileConfigStore::backup_path(&path).exists());

        fs::write(&path, b"{ not json").await.unwrap();

        let recovered = FileConfigStore::new(&path).await.unwrap();
        assert_eq!(recovered.load().await, "http://second/");

        // The main document was restored from the backup
        let content = fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("http://second/"));
    }

    #[tokio::test]
    async fn test_backup_exists_after_first_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = FileConfigStore::new(&path).await.unwrap();
        store.save("http://only/").await.unwrap();

        let backup = fs::read_to_string(FileConfigStore::backup_path(&path)).await.unwrap();
        assert!(backup.contains("http://only/"));
    }

    #[tokio::test]
    async fn test_corruption_without_backup_is_unset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"garbage").await.unwrap();

        let store = FileConfigStore::new(&path).await.unwrap();
        assert_eq!(store.load().await, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_document_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::new(&path).await.unwrap();
        store.save("http://host/").await.unwrap();

        let mode = fs::metadata(&path).await.unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let backup_mode = fs::metadata(FileConfigStore::backup_path(&path))
            .await
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(backup_mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_temp_file_does_not_leak_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::new(&path).await.unwrap();

        let temp = store.temp_path();
        fs::write(&temp, b"leftover").await.unwrap();
        fs::set_permissions(&temp, std::fs::Permissions::from_mode(0o644))
            .await
            .unwrap();

        store.save("http://host/").await.unwrap();

        let mode = fs::metadata(&path).await.unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert!(!temp.exists());
    }
}
