//! Error types for archive access
//!
//! Covers the read side of a packaged project:
//! - Container decoding (not a zip, truncated, oversized)
//! - Manifest lookup and JSON decoding
//! - Asset resolution against the catalog

/// Errors raised while reading an archive
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Byte buffer is not a valid zip container
    #[error("archive is corrupt: {0}")]
    Corrupt(String),

    /// Archive exceeds the configured size limit
    #[error("archive too large: {size} bytes (max: {limit})")]
    TooLarge { size: usize, limit: usize },

    /// `project.json` is absent
    #[error("manifest '{0}' not found in archive")]
    ManifestMissing(String),

    /// `project.json` is present but not valid JSON
    #[error("manifest '{name}' is not valid JSON: {source}")]
    ManifestParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Catalogued asset has no matching archive entry
    #[error("asset '{md5ext}' is catalogued but missing from the archive")]
    AssetMissing { md5ext: String },

    /// Entry decompresses to more than the configured size limit
    #[error("entry '{name}' decompresses past {limit} bytes")]
    EntryTooLarge { name: String, limit: usize },

    /// Entry exists but could not be decompressed
    #[error("failed to read entry '{name}': {message}")]
    EntryRead { name: String, message: String },

    /// Failure while writing a bulk asset package
    #[error("failed to package assets: {0}")]
    Package(String),

    /// Blocking decompression task did not complete
    #[error("archive task failed: {0}")]
    Task(String),
}

impl ArchiveError {
    /// Create corrupt-archive error from any displayable cause
    #[inline]
    pub fn corrupt(cause: impl std::fmt::Display) -> Self {
        Self::Corrupt(cause.to_string())
    }

    /// Create entry read error
    #[inline]
    pub fn entry_read(name: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::EntryRead {
            name: name.into(),
            message: cause.to_string(),
        }
    }

    /// Check if the error is a manifest/archive consistency violation
    #[inline]
    #[must_use]
    pub fn is_consistency_violation(&self) -> bool {
        matches!(self, Self::AssetMissing { .. })
    }
}

/// Result type alias for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_display() {
        let err = ArchiveError::corrupt("invalid Zip archive");
        assert_eq!(err.to_string(), "archive is corrupt: invalid Zip archive");
    }

    #[test]
    fn asset_missing_is_consistency_violation() {
        let err = ArchiveError::AssetMissing {
            md5ext: "abc.svg".to_string(),
        };
        assert!(err.is_consistency_violation());
        assert!(!ArchiveError::ManifestMissing("project.json".to_string()).is_consistency_violation());
    }

    #[test]
    fn too_large_display() {
        let err = ArchiveError::TooLarge { size: 10, limit: 5 };
        assert!(err.to_string().contains("max: 5"));
    }

    #[test]
    fn entry_too_large_display() {
        let err = ArchiveError::EntryTooLarge {
            name: "bomb.wav".to_string(),
            limit: 1024,
        };
        assert_eq!(err.to_string(), "entry 'bomb.wav' decompresses past 1024 bytes");
    }
}
