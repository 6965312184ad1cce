//! In-memory archive reader
//!
//! Wraps the raw `.sb3` bytes and exposes entries by name. The archive is
//! read-only: nothing in this crate ever writes back into it.

use crate::digest::ArchiveDigest;
use crate::error::{ArchiveError, ArchiveResult};
use std::collections::BTreeSet;
use std::io::{Cursor, Read};
use std::sync::Arc;
use zip::result::ZipError;
use zip::ZipArchive;

/// Well-known manifest entry name
pub const MANIFEST_ENTRY: &str = "project.json";

/// Default maximum archive size (50 MiB)
pub const DEFAULT_MAX_ARCHIVE_BYTES: usize = 50 * 1024 * 1024;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read-only view over a zip-compatible project container
///
/// Cheap to clone: the byte buffer is shared. The size limit given at open
/// also bounds every decompressed entry.
#[derive(Debug, Clone)]
pub struct Archive {
    data: Arc<[u8]>,
    entries: BTreeSet<String>,
    digest: ArchiveDigest,
    max_entry_bytes: usize,
}

impl Archive {
    /// Open archive from bytes with the default size limit
    ///
    /// # Errors
    /// - `ArchiveError::Corrupt` if the bytes are not a zip container
    /// - `ArchiveError::TooLarge` if the buffer exceeds 50 MiB
    pub fn open(bytes: impl Into<Arc<[u8]>>) -> ArchiveResult<Self> {
        Self::open_with_limit(bytes, DEFAULT_MAX_ARCHIVE_BYTES)
    }

    /// Open archive from bytes, rejecting buffers larger than `limit`
    ///
    /// # Errors
    /// - `ArchiveError::Corrupt` if the buffer is empty or not a zip container
    /// - `ArchiveError::TooLarge` if the buffer exceeds `limit`
    pub fn open_with_limit(bytes: impl Into<Arc<[u8]>>, limit: usize) -> ArchiveResult<Self> {
        let data: Arc<[u8]> = bytes.into();

        if data.is_empty() {
            return Err(ArchiveError::corrupt("empty buffer"));
        }
        if data.len() > limit {
            return Err(ArchiveError::TooLarge {
                size: data.len(),
                limit,
            });
        }

        let zip = ZipArchive::new(Cursor::new(&*data)).map_err(ArchiveError::corrupt)?;
        let entries: BTreeSet<String> = zip
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_owned)
            .collect();
        drop(zip);

        let digest = ArchiveDigest::compute(&data);
        tracing::debug!(
            digest = %digest.short(),
            entries = entries.len(),
            bytes = data.len(),
            "opened archive"
        );

        Ok(Self {
            data,
            entries,
            digest,
            max_entry_bytes: limit,
        })
    }

    /// Open archive on the blocking pool
    ///
    /// Decompression of the central directory happens off the async
    /// executor; the caller awaits the result.
    ///
    /// # Errors
    /// Same as [`Archive::open_with_limit`], plus `ArchiveError::Task` if the
    /// blocking task panicked.
    pub async fn open_async(bytes: Vec<u8>, limit: usize) -> ArchiveResult<Self> {
        tokio::task::spawn_blocking(move || Self::open_with_limit(bytes, limit))
            .await
            .map_err(|e| ArchiveError::Task(e.to_string()))?
    }

    /// Read an entry by name
    ///
    /// Returns `Ok(None)` if no entry has that name.
    ///
    /// # Errors
    /// - `ArchiveError::EntryRead` if the entry exists but cannot be decompressed
    /// - `ArchiveError::EntryTooLarge` if it decompresses past the size limit
    pub fn read_entry(&self, name: &str) -> ArchiveResult<Option<Vec<u8>>> {
        if !self.entries.contains(name) {
            return Ok(None);
        }

        let mut zip = ZipArchive::new(Cursor::new(&*self.data)).map_err(ArchiveError::corrupt)?;
        let mut file = match zip.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(ArchiveError::entry_read(name, e)),
        };

        let limit = self.max_entry_bytes;
        let declared = usize::try_from(file.size()).unwrap_or(usize::MAX);
        let mut buf = Vec::with_capacity(declared.min(limit));
        let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
        file.by_ref()
            .take(cap)
            .read_to_end(&mut buf)
            .map_err(|e| ArchiveError::entry_read(name, e))?;

        if buf.len() > limit {
            tracing::warn!(entry = name, limit, "archive entry exceeds size limit");
            return Err(ArchiveError::EntryTooLarge {
                name: name.to_string(),
                limit,
            });
        }

        tracing::trace!(entry = name, bytes = buf.len(), "read archive entry");
        Ok(Some(buf))
    }

    /// Read and decode a JSON entry
    ///
    /// # Errors
    /// - `ArchiveError::ManifestMissing` if the entry is absent
    /// - `ArchiveError::ManifestParse` if the entry is not valid JSON
    pub fn read_json_entry(&self, name: &str) -> ArchiveResult<serde_json::Value> {
        let bytes = self
            .read_entry(name)?
            .ok_or_else(|| ArchiveError::ManifestMissing(name.to_string()))?;

        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        serde_json::from_slice(body).map_err(|source| ArchiveError::ManifestParse {
            name: name.to_string(),
            source,
        })
    }

    /// Read and decode `project.json`
    ///
    /// # Errors
    /// See [`Archive::read_json_entry`]
    #[inline]
    pub fn manifest(&self) -> ArchiveResult<serde_json::Value> {
        self.read_json_entry(MANIFEST_ENTRY)
    }

    /// Check if an entry exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains(name)
    }

    /// Entry names in sorted order (directories excluded)
    #[must_use]
    pub fn entry_names(&self) -> Vec<&str> {
        self.entries.iter().map(String::as_str).collect()
    }

    /// Number of file entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if archive has no file entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Digest of the raw archive bytes
    #[inline]
    #[must_use]
    pub fn digest(&self) -> ArchiveDigest {
        self.digest
    }

    /// Size of the raw archive in bytes
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}
