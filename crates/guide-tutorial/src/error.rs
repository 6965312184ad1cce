//! Error types for tutorial synthesis
//!
//! Two failure classes reach callers:
//! - The generative capability was unreachable, failed, or timed out
//! - Its response could not be reconciled with the tutorial schema

use std::fmt::{self, Display, Formatter};

/// One field-level schema violation
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    /// JSON pointer to the offending value (`""` for the document root)
    pub path: String,
    /// Human-readable reason
    pub message: String,
}

impl Violation {
    /// Create violation
    #[inline]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Errors raised by the generative-model boundary
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Transport failure
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the endpoint
    #[error("model endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response carried no content
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Client misconfiguration (missing key, bad URL)
    #[error("model client misconfigured: {0}")]
    Config(String),

    /// Any other model-side failure
    #[error("model failure: {0}")]
    Other(String),
}

/// Errors raised while synthesizing a tutorial
#[derive(Debug, thiserror::Error)]
pub enum TutorialError {
    /// Generative capability failed or timed out
    #[error("tutorial synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    /// Response does not match the tutorial schema
    #[error("response violates tutorial schema: {}", join_violations(.violations))]
    SchemaViolation { violations: Vec<Violation> },

    /// Embedded schema failed to compile
    #[error("tutorial schema is invalid: {0}")]
    Schema(String),

    /// Prompt input could not be encoded
    #[error("failed to encode prompt: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TutorialError {
    /// Create synthesis-unavailable error from any displayable cause
    #[inline]
    pub fn unavailable(cause: impl Display) -> Self {
        Self::SynthesisUnavailable(cause.to_string())
    }

    /// Create schema violation with a single root-level entry
    #[inline]
    pub fn violation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            violations: vec![Violation::new(path, message)],
        }
    }

    /// Check if a later attempt may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SynthesisUnavailable(_))
    }

    /// Field-level violations, empty for other errors
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::SchemaViolation { violations } => violations,
            _ => &[],
        }
    }
}

/// Errors raised while exporting a tutorial document
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Tutorial text could not be assembled
    #[error("failed to format export text")]
    Format(#[from] fmt::Error),

    /// Document sink refused the content
    #[error("document export rejected: {0}")]
    Rejected(String),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for tutorial operations
pub type TutorialResult<T> = Result<T, TutorialError>;
