//! Digest-addressed project cache using moka
//!
//! Ingested projects are immutable, so they are shared as `Arc`s keyed by
//! the blake3 digest of the archive bytes. Identical uploads parse once,
//! including uploads that arrive while the first parse is still running.

use crate::pipeline::IngestedProject;
use guide_archive::ArchiveDigest;
use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// Cache of immutable values by archive digest
///
/// Clones share the same underlying storage.
pub struct DigestCache<V> {
    inner: Cache<ArchiveDigest, Arc<V>>,
}

impl<V: Send + Sync + 'static> std::fmt::Debug for DigestCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestCache")
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

impl<V> Clone for DigestCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// Cache of ingested projects
pub type ProjectCache = DigestCache<IngestedProject>;

impl<V: Send + Sync + 'static> DigestCache<V> {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Insert value
    #[inline]
    pub async fn insert(&self, digest: ArchiveDigest, value: Arc<V>) {
        self.inner.insert(digest, value).await;
    }

    /// Get value
    #[inline]
    pub async fn get(&self, digest: &ArchiveDigest) -> Option<Arc<V>> {
        self.inner.get(digest).await
    }

    /// Get or compute value, caching only successes
    ///
    /// Concurrent callers for the same digest wait on a single run of `f`
    /// and share its result.
    ///
    /// # Errors
    /// Returns the error `f` produced, shared with every caller that waited
    /// on it; nothing is cached in that case
    pub async fn try_get_or_insert_with<E, F, Fut>(
        &self,
        digest: ArchiveDigest,
        f: F,
    ) -> Result<Arc<V>, Arc<E>>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.inner
            .try_get_with(digest, async move {
                tracing::debug!(digest = %digest.short(), "cache miss");
                f().await.map(Arc::new)
            })
            .await
    }

    /// Invalidate cache entry
    #[inline]
    pub async fn invalidate(&self, digest: &ArchiveDigest) {
        self.inner.invalidate(digest).await;
    }

    /// Check if cache contains digest
    #[inline]
    #[must_use]
    pub fn contains(&self, digest: &ArchiveDigest) -> bool {
        self.inner.contains_key(digest)
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }

    /// Get approximate entry count
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Flush pending maintenance so counts are exact
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl<V: Send + Sync + 'static> Default for DigestCache<V> {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CACHE_CAPACITY)
    }
}
