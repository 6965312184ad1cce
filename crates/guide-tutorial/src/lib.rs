//! Scratch Guide Tutorial Synthesis
//!
//! Turns a project model into a schema-validated tutorial.
//!
//! # Core Concepts
//!
//! - [`ProjectSummary`]: Bounded, lossy description of a project
//! - [`PromptScaffold`]: Fixed instructional prompt around the summary
//! - [`GenerativeModel`]: Black-box text generator ([`OpenAiChatModel`] talks HTTP)
//! - [`TutorialValidator`]: Normalizes and validates raw responses
//! - [`TutorialSynthesizer`]: One call per project, bounded by a timeout
//! - [`DocumentExporter`]: Flat-text export boundary
//!
//! # Example
//!
//! ```rust,ignore
//! use guide_tutorial::{OpenAiChatModel, ModelSettings, SynthesisOptions, TutorialSynthesizer};
//! use std::sync::Arc;
//!
//! let model = OpenAiChatModel::new(ModelSettings::default().with_api_key(key))?;
//! let synthesizer = TutorialSynthesizer::new(Arc::new(model), SynthesisOptions::default())?;
//! let tutorial = synthesizer.synthesize(&project).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod export;
mod model;
mod openai;
mod prompt;
mod schema;
mod summary;
mod synthesizer;
mod validator;

pub use error::{ExportError, ModelError, TutorialError, TutorialResult, Violation};
pub use export::{
    format_for_export, DocumentExporter, ExportedDocument, PlaceholderExporter,
    PLACEHOLDER_DOCUMENT_ID,
};
pub use model::{GenerationRequest, GenerativeModel};
pub use openai::{ModelSettings, OpenAiChatModel, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use prompt::{PromptScaffold, SYSTEM_PROMPT};
pub use schema::{tutorial_schema, SpriteSummary, Step, StepTarget, TargetType, Tutorial};
pub use summary::{BlockSample, ProjectSummary, SummaryOptions, TargetSummary};
pub use synthesizer::{SynthesisOptions, TutorialSynthesizer, DEFAULT_TIMEOUT};
pub use validator::{normalize, TutorialValidator};

/// Common imports
pub mod prelude {
    pub use crate::{
        GenerationRequest, GenerativeModel, Tutorial, TutorialError, TutorialResult,
        TutorialSynthesizer, TutorialValidator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
