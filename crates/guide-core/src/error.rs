//! Error types for the pipeline
//!
//! Wraps the component errors and adds:
//! - Configuration loading failures
//! - Lookups of assets the catalog does not know
//! - Blocking tasks that did not complete

use guide_archive::ArchiveError;
use guide_project::ProjectError;
use guide_tutorial::TutorialError;
use std::path::PathBuf;
use std::sync::Arc;

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment override has the wrong format
    #[error("invalid value for {name}: '{value}'")]
    Env { name: String, value: String },

    /// Value out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create read error for path
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Top-level pipeline error
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Archive could not be opened or read
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Manifest has the wrong shape
    #[error(transparent)]
    Project(ProjectError),

    /// Synthesis or validation failed
    #[error(transparent)]
    Tutorial(#[from] TutorialError),

    /// Configuration is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Requested asset is not in the catalog
    #[error("asset '{0}' is not in the catalog")]
    UnknownAsset(String),

    /// Blocking task panicked or was cancelled
    #[error("pipeline task failed: {0}")]
    TaskFailed(String),

    /// Failure of an ingestion that several callers waited on
    #[error(transparent)]
    Shared(Arc<PipelineError>),
}

impl From<ProjectError> for PipelineError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::Archive(e) => Self::Archive(e),
            other => Self::Project(other),
        }
    }
}

impl PipelineError {
    /// Check if retrying the same input may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Tutorial(e) => e.is_retryable(),
            Self::TaskFailed(_) => true,
            Self::Shared(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Take sole ownership of an error from the project cache
    ///
    /// Falls back to [`PipelineError::Shared`] while other callers still
    /// hold the same error.
    #[must_use]
    pub fn from_shared(err: Arc<Self>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(Self::Shared)
    }

    /// Check if the structural project data is still usable
    #[inline]
    #[must_use]
    pub fn keeps_project(&self) -> bool {
        match self {
            Self::Shared(e) => e.keeps_project(),
            other => matches!(
                other,
                Self::Tutorial(
                    TutorialError::SynthesisUnavailable(_) | TutorialError::SchemaViolation { .. }
                )
            ),
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
