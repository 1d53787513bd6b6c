//! Variant byte storage backends
//!
//! Variant bytes live either on disk under the cache directory or in an
//! in-process map; entry metadata is tracked by the cache layer in both
//! cases.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::fs;
use tokio::sync::RwLock;

/// A variant found in the backend during startup rehydration
pub struct FoundVariant {
    pub key: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Storage backend for variant bytes, keyed by variant path
pub enum VariantStore {
    Disk { root: PathBuf },
    Memory { blobs: RwLock<HashMap<String, Vec<u8>>> },
}

impl VariantStore {
    /// On-disk storage rooted at `root`
    pub fn disk(root: PathBuf) -> Self {
        VariantStore::Disk { root }
    }

    /// Fully in-memory storage
    pub fn memory() -> Self {
        VariantStore::Memory {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Ensure the backend is ready to accept writes
    pub async fn init(&self) -> io::Result<()> {
        match self {
            VariantStore::Disk { root } => fs::create_dir_all(root).await,
            VariantStore::Memory { .. } => Ok(()),
        }
    }

    /// Read variant bytes; NotFound when the key has never been written
    pub async fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        match self {
            VariantStore::Disk { root } => fs::read(root.join(key)).await,
            VariantStore::Memory { blobs } => blobs
                .read()
                .await
                .get(key)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    /// Write variant bytes, replacing any previous value
    pub async fn write(&self, key: &str, data: &[u8]) -> io::Result<()> {
        match self {
            VariantStore::Disk { root } => {
                let path = root.join(key);
                // Keys mirror source URL paths and may contain subdirectories
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).await?;
                }
                fs::write(&path, data).await
            }
            VariantStore::Memory { blobs } => {
                blobs.write().await.insert(key.to_string(), data.to_vec());
                Ok(())
            }
        }
    }

    /// List variants already present in the backend.
    ///
    /// Disk storage survives restarts; the cache layer rebuilds its
    /// metadata from this listing. Memory storage always starts empty.
    pub async fn scan(&self) -> io::Result<Vec<FoundVariant>> {
        let root = match self {
            VariantStore::Disk { root } => root,
            VariantStore::Memory { .. } => return Ok(Vec::new()),
        };

        let mut found = Vec::new();
        let mut pending = vec![root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };

            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    let path = entry.path();
                    let rel = match path.strip_prefix(root) {
                        Ok(rel) => rel,
                        Err(_) => continue,
                    };
                    let key = rel
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");

                    let metadata = entry.metadata().await?;
                    found.push(FoundVariant {
                        key,
                        size: metadata.len(),
                        modified: metadata.modified().unwrap_or_else(|_| SystemTime::now()),
                    });
                }
            }
        }

        Ok(found)
    }

    /// Best-effort removal of a variant
    pub async fn remove(&self, key: &str) {
        match self {
            VariantStore::Disk { root } => {
                let _ = fs::remove_file(root.join(key)).await;
            }
            VariantStore::Memory { blobs } => {
                blobs.write().await.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_disk_roundtrip_with_subdirectories() {
        let dir = tempdir().unwrap();
        let store = VariantStore::disk(dir.path().to_path_buf());
        store.init().await.unwrap();

        store
            .write("large_photos/123/cat.jpg", b"jpeg bytes")
            .await
            .unwrap();

        let data = store.read("large_photos/123/cat.jpg").await.unwrap();
        assert_eq!(data, b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_disk_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = VariantStore::disk(dir.path().to_path_buf());
        store.init().await.unwrap();

        let err = store.read("small_missing.png").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_memory_roundtrip_and_remove() {
        let store = VariantStore::memory();
        store.init().await.unwrap();

        store.write("medium_a.png", b"png bytes").await.unwrap();
        assert_eq!(store.read("medium_a.png").await.unwrap(), b"png bytes");

        store.remove("medium_a.png").await;
        assert!(store.read("medium_a.png").await.is_err());
    }

    #[tokio::test]
    async fn test_scan_lists_disk_variants() {
        let dir = tempdir().unwrap();
        let store = VariantStore::disk(dir.path().to_path_buf());
        store.init().await.unwrap();

        store.write("small_a.png", b"123").await.unwrap();
        store
            .write("large_photos/123/cat.jpg", b"12345")
            .await
            .unwrap();

        let mut found = store.scan().await.unwrap();
        found.sort_by(|a, b| a.key.cmp(&b.key));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].key, "large_photos/123/cat.jpg");
        assert_eq!(found[0].size, 5);
        assert_eq!(found[1].key, "small_a.png");
        assert_eq!(found[1].size, 3);
    }

    #[tokio::test]
    async fn test_scan_memory_is_empty() {
        let store = VariantStore::memory();
        store.write("small_a.png", b"123").await.unwrap();
        assert!(store.scan().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_replaces_existing() {
        let store = VariantStore::memory();
        store.write("small_a.png", b"old").await.unwrap();
        store.write("small_a.png", b"new").await.unwrap();
        assert_eq!(store.read("small_a.png").await.unwrap(), b"new");
    }
}
