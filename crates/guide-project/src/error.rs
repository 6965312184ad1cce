//! Error types for project model construction

use guide_archive::ArchiveError;

/// Errors raised while building a project model
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// Manifest root has the wrong shape
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// Archive could not supply the manifest
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl ProjectError {
    /// Create invalid-manifest error
    #[inline]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidManifest(message.into())
    }
}

/// Result type alias for project operations
pub type ProjectResult<T> = Result<T, ProjectError>;
