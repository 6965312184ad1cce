//! Generative-model boundary
//!
//! The synthesizer sees the generative capability only through
//! [`GenerativeModel`]: a system prompt and a user prompt go in, text comes out.

use crate::error::ModelError;

/// One generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Role instructions
    pub system_prompt: String,
    /// Task and project data
    pub user_prompt: String,
    /// Ask for a JSON-only response when the backend supports it
    pub json_mode: bool,
}

/// Black-box text generator
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a single response
    async fn generate(&self, request: GenerationRequest) -> Result<String, ModelError>;
}
