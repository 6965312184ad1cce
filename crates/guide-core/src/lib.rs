//! Scratch Guide Core
//!
//! Wires the archive reader, project builder, and tutorial synthesizer into
//! one per-invocation pipeline.
//!
//! # Core Concepts
//!
//! - [`GuideConfig`]: Defaults, TOML file, environment overrides
//! - [`TutorialPipeline`]: Ingest, synthesize, deliver assets
//! - [`IngestedProject`]: Archive, project model, and catalog of one upload
//! - [`ProjectCache`]: Ingested projects by archive digest
//!
//! # Example
//!
//! ```rust,ignore
//! use guide_core::{GuideConfig, TutorialPipeline};
//! use guide_tutorial::OpenAiChatModel;
//! use std::sync::Arc;
//!
//! let config = GuideConfig::load(None)?;
//! let model = OpenAiChatModel::new(config.model.clone())?;
//! let pipeline = TutorialPipeline::new(config, Arc::new(model))?;
//! let outcome = pipeline.run(bytes).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod cache;
mod config;
mod error;
mod pipeline;

pub use cache::{CacheStats, DigestCache, ProjectCache};
pub use config::{
    ArchiveSettings, GuideConfig, RenderSettings, SynthesisSettings, DEFAULT_CACHE_CAPACITY,
    ENV_API_KEY, ENV_BASE_URL, ENV_MODEL, ENV_TIMEOUT_SECS,
};
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{IngestedProject, PipelineOutcome, TutorialPipeline};

/// Common imports
pub mod prelude {
    pub use crate::{
        GuideConfig, IngestedProject, PipelineError, PipelineOutcome, PipelineResult,
        TutorialPipeline,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
