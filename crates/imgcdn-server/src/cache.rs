//! Variant caching with in-memory metadata
//!
//! Tracks content type, size and age for every stored variant, enforces
//! TTL expiration on read and evicts oldest entries when the configured
//! total size would be exceeded.

use crate::error::Result;
use crate::store::VariantStore;
use crate::types::{CacheEntry, CacheStats};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A variant cache with in-memory metadata over a pluggable byte store
pub struct VariantCache {
    /// In-memory metadata for cached variants
    entries: RwLock<HashMap<String, CacheEntry>>,
    /// Where variant bytes are stored
    store: VariantStore,
    /// Maximum total size in bytes
    max_size: u64,
    /// Entry TTL in seconds
    ttl_secs: u64,
    /// Current total size of cached variants
    current_size: AtomicU64,
    /// Cache hit counter
    hits: AtomicU64,
    /// Cache miss counter
    misses: AtomicU64,
}

impl VariantCache {
    /// Create a new variant cache
    pub fn new(store: VariantStore, max_size: u64, ttl_secs: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            store,
            max_size,
            ttl_secs,
            current_size: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Initialize the underlying store and rebuild metadata.
    ///
    /// Disk variants survive restarts; previously issued cachedUrls
    /// paths keep serving because the scan turns every file found back
    /// into an entry (content type from the extension, file mtime as
    /// its creation time so TTL still applies).
    pub async fn init(&self) -> Result<()> {
        self.store.init().await?;

        let existing = self.store.scan().await?;
        if !existing.is_empty() {
            let mut total: u64 = 0;
            let mut entries = self.entries.write().await;
            for variant in existing {
                total += variant.size;
                let content_type = content_type_for(&variant.key).to_string();
                entries.insert(
                    variant.key,
                    CacheEntry {
                        content_type,
                        size: variant.size,
                        created_at: DateTime::<Utc>::from(variant.modified),
                    },
                );
            }
            self.current_size.store(total, Ordering::Relaxed);
            info!(entries = entries.len(), "Rehydrated cache metadata");
        }

        info!("Cache initialized");
        Ok(())
    }

    /// Whether a variant exists and has not expired.
    ///
    /// Does not touch the hit/miss counters; used to decide whether a
    /// source needs refetching.
    pub async fn is_fresh(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => {
                let age_secs = (Utc::now() - entry.created_at).num_seconds().max(0) as u64;
                age_secs <= self.ttl_secs
            }
            None => false,
        }
    }

    /// Get a variant, returns (data, content_type) if present and fresh
    pub async fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        let entry = {
            let entries = self.entries.read().await;
            entries.get(key).cloned()
        };

        if let Some(entry) = entry {
            let age_secs = (Utc::now() - entry.created_at).num_seconds().max(0) as u64;
            if age_secs > self.ttl_secs {
                debug!(key = %key, age_secs, ttl_secs = self.ttl_secs, "Cache entry expired");
                self.remove(key).await;
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }

            match self.store.read(key).await {
                Ok(data) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "Cache hit");
                    return Some((data, entry.content_type));
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Failed to read cached variant, removing entry");
                    self.remove(key).await;
                }
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a variant, replacing any existing entry under the same key
    pub async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let size = data.len() as u64;

        // Replacing an entry frees its bytes before the eviction check
        let previous = {
            let mut entries = self.entries.write().await;
            entries.remove(key)
        };
        if let Some(old) = previous {
            self.current_size.fetch_sub(old.size, Ordering::Relaxed);
        }

        self.evict_if_needed(size).await;

        self.store.write(key, data).await?;

        let entry = CacheEntry {
            content_type: content_type.to_string(),
            size,
            created_at: Utc::now(),
        };

        {
            let mut entries = self.entries.write().await;
            entries.insert(key.to_string(), entry);
        }

        self.current_size.fetch_add(size, Ordering::Relaxed);
        debug!(key = %key, size, "Cached variant");

        Ok(())
    }

    /// Evict oldest entries until there's enough room for new_size bytes
    async fn evict_if_needed(&self, new_size: u64) {
        let current = self.current_size.load(Ordering::Relaxed);

        if current + new_size <= self.max_size {
            return;
        }

        let target_size = self.max_size.saturating_sub(new_size);

        loop {
            let current = self.current_size.load(Ordering::Relaxed);
            if current <= target_size {
                break;
            }

            let oldest_key = {
                let entries = self.entries.read().await;
                entries
                    .iter()
                    .min_by_key(|(_, e)| e.created_at)
                    .map(|(k, _)| k.clone())
            };

            if let Some(key) = oldest_key {
                self.remove(&key).await;
                debug!(key = %key, "Evicted oldest cache entry");
            } else {
                break;
            }
        }
    }

    /// Remove an entry from the cache
    async fn remove(&self, key: &str) {
        let entry = {
            let mut entries = self.entries.write().await;
            entries.remove(key)
        };

        if let Some(entry) = entry {
            self.current_size.fetch_sub(entry.size, Ordering::Relaxed);
            self.store.remove(key).await;
        }
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats {
            entries: entries.len(),
            total_size: self.current_size.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Content type for a rehydrated variant, from its file extension
fn content_type_for(key: &str) -> &'static str {
    let extension = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
